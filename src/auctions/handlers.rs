use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::state::AppState;

use super::dto::{BidQuery, CreateAuctionRequest};
use super::model::Auction;
use super::service::AuctionError;

pub fn auction_routes() -> Router<AppState> {
    Router::new()
        .route("/auctions", post(create_auction).get(list_auctions))
        .route("/auctions/:id", get(get_auction))
        .route("/auctions/:id/bid", post(place_bid))
        .route("/auctions/:id/end", post(end_auction))
}

#[instrument(skip(state, payload))]
pub async fn create_auction(
    State(state): State<AppState>,
    Json(payload): Json<CreateAuctionRequest>,
) -> Result<Json<Auction>, (StatusCode, String)> {
    match state.auctions.create(payload).await {
        Ok(auction) => Ok(Json(auction)),
        Err(AuctionError::Invalid(msg)) => Err((StatusCode::BAD_REQUEST, msg)),
        Err(e) => Err(internal(e)),
    }
}

#[instrument(skip(state))]
pub async fn list_auctions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Auction>>, (StatusCode, String)> {
    let auctions = state.auctions.list().await.map_err(internal)?;
    Ok(Json(auctions))
}

#[instrument(skip(state))]
pub async fn get_auction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Auction>, (StatusCode, String)> {
    match state.auctions.get(id).await.map_err(internal)? {
        Some(auction) => Ok(Json(auction)),
        None => Err((StatusCode::NOT_FOUND, "Auction not found".into())),
    }
}

/// Returns the confirmation string whether or not the auction exists; a
/// missing target is a no-op by design.
#[instrument(skip(state))]
pub async fn place_bid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<BidQuery>,
) -> Result<String, (StatusCode, String)> {
    state
        .auctions
        .place_bid(id, q.bid_amount)
        .await
        .map_err(internal)?;
    Ok(format!("Bid of {} placed on auction {}", q.bid_amount, id))
}

#[instrument(skip(state))]
pub async fn end_auction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<String, (StatusCode, String)> {
    state.auctions.end(id).await.map_err(internal)?;
    Ok(format!("Auction {} ended.", id))
}

fn internal<E: std::error::Error>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
