use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle state of an auction. The only transition this service performs
/// is `Active` -> `Ended`; it never reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Active,
    Ended,
    Pending,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Active => "active",
            AuctionStatus::Ended => "ended",
            AuctionStatus::Pending => "pending",
        }
    }
}

impl FromStr for AuctionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AuctionStatus::Active),
            "ended" => Ok(AuctionStatus::Ended),
            "pending" => Ok(AuctionStatus::Pending),
            other => Err(anyhow::anyhow!("unknown auction status: {other}")),
        }
    }
}

/// Auction record as stored and as served on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id: Option<Uuid>,         // store-assigned on first save
    pub auction_id: i64,          // on-chain id
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub seller_address: String,
    pub starting_price: i64,      // smallest currency unit
    pub duration: i64,            // seconds
    pub category: String,
    pub current_bid: i64,
    pub bid_count: i32,
    pub status: AuctionStatus,
    pub created_at: i64,          // epoch milliseconds
}
