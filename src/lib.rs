pub mod app;
pub mod auctions;
pub mod clock;
pub mod config;
pub mod ledger;
pub mod state;
pub mod users;
