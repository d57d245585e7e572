use serde::Deserialize;

/// Request body for auction creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuctionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    /// Pre-negotiated on-chain id; 0 or absent means "allocate one".
    #[serde(default)]
    pub auction_id: i64,
    #[serde(default)]
    pub seller_address: String,
    pub starting_price: i64,
    pub duration: i64,
    pub category: Option<String>,
}

/// Query string for bid placement: `?bidAmount=N`.
#[derive(Debug, Deserialize)]
pub struct BidQuery {
    #[serde(rename = "bidAmount")]
    pub bid_amount: i64,
}
