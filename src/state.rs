use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::warn;

use crate::auctions::service::AuctionService;
use crate::auctions::store::{AuctionStore, MemAuctionStore, PgAuctionStore};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::ledger::{Ledger, LogLedger};
use crate::users::password;
use crate::users::service::UserService;
use crate::users::store::{MemUserStore, PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub auctions: AuctionService,
    pub users: UserService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let (auction_store, user_store): (Arc<dyn AuctionStore>, Arc<dyn UserStore>) =
            match &config.database_url {
                Some(url) => {
                    let db = PgPoolOptions::new()
                        .max_connections(10)
                        .connect(url)
                        .await
                        .context("connect to database")?;
                    // Run migrations if present
                    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                        warn!(error = %e, "migrations folder not found or migration failed; continuing");
                    }
                    (
                        Arc::new(PgAuctionStore::new(db.clone())) as Arc<dyn AuctionStore>,
                        Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>,
                    )
                }
                None => {
                    warn!("DATABASE_URL not set; using the in-memory store, state is lost on restart");
                    (
                        Arc::new(MemAuctionStore::default()) as Arc<dyn AuctionStore>,
                        Arc::new(MemUserStore::default()) as Arc<dyn UserStore>,
                    )
                }
            };

        Ok(Self::from_parts(auction_store, user_store, clock, config))
    }

    pub fn from_parts(
        auction_store: Arc<dyn AuctionStore>,
        user_store: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
        config: Arc<AppConfig>,
    ) -> Self {
        let ledger: Arc<dyn Ledger> = Arc::new(LogLedger::new(clock.clone()));
        let passwords = password::scheme(&config.password_scheme);
        Self {
            auctions: AuctionService::new(auction_store, ledger, clock.clone()),
            users: UserService::new(user_store, passwords, clock),
            config,
        }
    }

    /// Fully in-memory state for tests.
    pub fn fake() -> Self {
        Self::fake_at(Arc::new(SystemClock))
    }

    /// In-memory state driven by the supplied clock, for tests that steer
    /// time.
    pub fn fake_at(clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(
            Arc::new(MemAuctionStore::default()),
            Arc::new(MemUserStore::default()),
            clock,
            Arc::new(AppConfig::test_defaults()),
        )
    }
}
