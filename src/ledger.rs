use std::sync::Arc;

use axum::async_trait;
use thiserror::Error;
use tracing::info;

use crate::clock::Clock;

/// Errors from the settlement backend. The logging stub never produces one,
/// but a real integration will, and the lifecycle manager must fail the
/// enclosing operation when it does.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    #[error("ledger rejected the call: {0}")]
    Rejected(String),
}

/// Settlement-chain boundary used by the auction lifecycle manager.
///
/// Exactly three calls; `create_auction` is the only one that returns a
/// value (the on-chain auction id). A real settlement backend replaces
/// [`LogLedger`] behind this trait without the callers changing.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn create_auction(
        &self,
        auction_id: i64,
        starting_price: i64,
        duration: i64,
    ) -> Result<i64, LedgerError>;

    async fn place_bid(&self, auction_id: i64, amount: i64) -> Result<(), LedgerError>;

    async fn end_auction(&self, auction_id: i64) -> Result<(), LedgerError>;
}

/// Stand-in ledger: emits a log line per call and mocks the on-chain id.
pub struct LogLedger {
    clock: Arc<dyn Clock>,
}

impl LogLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl Ledger for LogLedger {
    async fn create_auction(
        &self,
        auction_id: i64,
        starting_price: i64,
        duration: i64,
    ) -> Result<i64, LedgerError> {
        info!(auction_id, starting_price, duration, "creating auction on ledger");
        // Placeholder id allocation: pass a supplied positive id through,
        // otherwise derive one from the current time.
        Ok(if auction_id > 0 {
            auction_id
        } else {
            self.clock.now_millis()
        })
    }

    async fn place_bid(&self, auction_id: i64, amount: i64) -> Result<(), LedgerError> {
        info!(auction_id, amount, "placing bid on ledger");
        Ok(())
    }

    async fn end_auction(&self, auction_id: i64) -> Result<(), LedgerError> {
        info!(auction_id, "ending auction on ledger");
        Ok(())
    }
}
