use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::ledger::{Ledger, LedgerError};

use super::dto::CreateAuctionRequest;
use super::model::{Auction, AuctionStatus};
use super::store::AuctionStore;

#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Auction lifecycle manager: creation, listing with status correction, bid
/// placement and ending.
#[derive(Clone)]
pub struct AuctionService {
    store: Arc<dyn AuctionStore>,
    ledger: Arc<dyn Ledger>,
    clock: Arc<dyn Clock>,
}

impl AuctionService {
    pub fn new(store: Arc<dyn AuctionStore>, ledger: Arc<dyn Ledger>, clock: Arc<dyn Clock>) -> Self {
        Self { store, ledger, clock }
    }

    pub async fn create(&self, input: CreateAuctionRequest) -> Result<Auction, AuctionError> {
        if input.starting_price < 0 {
            return Err(AuctionError::Invalid(
                "startingPrice must be non-negative".into(),
            ));
        }
        if input.duration <= 0 {
            return Err(AuctionError::Invalid("duration must be positive".into()));
        }

        let on_chain_id = self
            .ledger
            .create_auction(input.auction_id, input.starting_price, input.duration)
            .await?;

        let auction = Auction {
            id: None,
            auction_id: on_chain_id,
            title: input.title,
            description: input.description,
            image_url: input.image_url,
            seller_address: input.seller_address,
            starting_price: input.starting_price,
            duration: input.duration,
            category: input.category.unwrap_or_else(|| "Other".to_string()),
            current_bid: input.starting_price,
            bid_count: 0,
            status: AuctionStatus::Active,
            created_at: self.clock.now_millis(),
        };
        let auction = self.store.save(auction).await?;
        info!(id = ?auction.id, on_chain_id, "auction created");
        Ok(auction)
    }

    /// Returns all auctions with their statuses corrected. This is a lazy
    /// sweep: every listing re-evaluates elapsed duration and persists any
    /// `Active` -> `Ended` flip. There is no background timer.
    pub async fn list(&self) -> Result<Vec<Auction>, AuctionError> {
        let mut auctions = self.store.find_all().await?;
        let now = self.clock.now_millis();
        for auction in &mut auctions {
            if Self::expired(auction, now) {
                auction.status = AuctionStatus::Ended;
                *auction = self.store.save(auction.clone()).await?;
                debug!(id = ?auction.id, "auction expired, status flipped to ended");
            }
        }
        Ok(auctions)
    }

    /// Returns one auction, applying the same persisted status correction as
    /// [`list`](Self::list) so the two reads always agree.
    pub async fn get(&self, id: Uuid) -> Result<Option<Auction>, AuctionError> {
        let Some(mut auction) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };
        if Self::expired(&auction, self.clock.now_millis()) {
            auction.status = AuctionStatus::Ended;
            auction = self.store.save(auction).await?;
            debug!(%id, "auction expired, status flipped to ended");
        }
        Ok(Some(auction))
    }

    /// Records a bid. A missing auction id is a silent no-op (`Ok(false)`).
    /// The amount is NOT validated against the current bid: whatever is
    /// supplied becomes the current bid and the bid count is incremented.
    pub async fn place_bid(&self, id: Uuid, amount: i64) -> Result<bool, AuctionError> {
        let Some(mut auction) = self.store.find_by_id(id).await? else {
            debug!(%id, "bid on unknown auction ignored");
            return Ok(false);
        };

        self.ledger.place_bid(auction.auction_id, amount).await?;

        // Read-modify-write with no compare-and-set: two concurrent bids on
        // the same auction race, last write wins. A transaction or CAS on the
        // store is required if that ever has to be correct.
        auction.current_bid = amount;
        auction.bid_count += 1;
        self.store.save(auction).await?;
        info!(%id, amount, "bid placed");
        Ok(true)
    }

    /// Ends an auction. Idempotent; a missing id is a silent no-op.
    pub async fn end(&self, id: Uuid) -> Result<bool, AuctionError> {
        let Some(mut auction) = self.store.find_by_id(id).await? else {
            debug!(%id, "end of unknown auction ignored");
            return Ok(false);
        };

        self.ledger.end_auction(auction.auction_id).await?;
        auction.status = AuctionStatus::Ended;
        self.store.save(auction).await?;
        info!(%id, "auction ended");
        Ok(true)
    }

    fn expired(auction: &Auction, now: i64) -> bool {
        if auction.status != AuctionStatus::Active {
            return false;
        }
        // Durations are only validated as positive, so the end time can
        // exceed i64; treat an unrepresentable end time as "never expires"
        // instead of overflowing.
        match auction
            .duration
            .checked_mul(1000)
            .and_then(|ms| auction.created_at.checked_add(ms))
        {
            Some(end) => end < now,
            None => false,
        }
    }
}
