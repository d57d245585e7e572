use std::collections::HashMap;

use axum::async_trait;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Auction, AuctionStatus};

/// Gateway for auction records. One entity write per call is atomic; nothing
/// beyond that is guaranteed.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// Persists the auction, assigning a fresh id on first save.
    async fn save(&self, auction: Auction) -> anyhow::Result<Auction>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Auction>>;

    /// Ordering of the returned records is implementation-defined.
    async fn find_all(&self) -> anyhow::Result<Vec<Auction>>;
}

#[derive(Clone)]
pub struct PgAuctionStore {
    db: PgPool,
}

impl PgAuctionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct AuctionRow {
    id: Uuid,
    auction_id: i64,
    title: String,
    description: String,
    image_url: String,
    seller_address: String,
    starting_price: i64,
    duration: i64,
    category: String,
    current_bid: i64,
    bid_count: i32,
    status: String,
    created_at: i64,
}

fn from_row(row: AuctionRow) -> anyhow::Result<Auction> {
    let status: AuctionStatus = row.status.parse()?;
    Ok(Auction {
        id: Some(row.id),
        auction_id: row.auction_id,
        title: row.title,
        description: row.description,
        image_url: row.image_url,
        seller_address: row.seller_address,
        starting_price: row.starting_price,
        duration: row.duration,
        category: row.category,
        current_bid: row.current_bid,
        bid_count: row.bid_count,
        status,
        created_at: row.created_at,
    })
}

const SELECT_AUCTION: &str = r#"
    SELECT id, auction_id, title, description, image_url, seller_address,
           starting_price, duration, category, current_bid, bid_count,
           status, created_at
    FROM auctions
"#;

#[async_trait]
impl AuctionStore for PgAuctionStore {
    async fn save(&self, mut auction: Auction) -> anyhow::Result<Auction> {
        match auction.id {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE auctions
                    SET auction_id = $2, title = $3, description = $4,
                        image_url = $5, seller_address = $6, starting_price = $7,
                        duration = $8, category = $9, current_bid = $10,
                        bid_count = $11, status = $12, created_at = $13
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(auction.auction_id)
                .bind(&auction.title)
                .bind(&auction.description)
                .bind(&auction.image_url)
                .bind(&auction.seller_address)
                .bind(auction.starting_price)
                .bind(auction.duration)
                .bind(&auction.category)
                .bind(auction.current_bid)
                .bind(auction.bid_count)
                .bind(auction.status.as_str())
                .bind(auction.created_at)
                .execute(&self.db)
                .await?;
            }
            None => {
                let id = Uuid::new_v4();
                sqlx::query(
                    r#"
                    INSERT INTO auctions
                        (id, auction_id, title, description, image_url,
                         seller_address, starting_price, duration, category,
                         current_bid, bid_count, status, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                    "#,
                )
                .bind(id)
                .bind(auction.auction_id)
                .bind(&auction.title)
                .bind(&auction.description)
                .bind(&auction.image_url)
                .bind(&auction.seller_address)
                .bind(auction.starting_price)
                .bind(auction.duration)
                .bind(&auction.category)
                .bind(auction.current_bid)
                .bind(auction.bid_count)
                .bind(auction.status.as_str())
                .bind(auction.created_at)
                .execute(&self.db)
                .await?;
                auction.id = Some(id);
            }
        }
        Ok(auction)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Auction>> {
        let row = sqlx::query_as::<_, AuctionRow>(&format!("{SELECT_AUCTION} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.map(from_row).transpose()
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Auction>> {
        let rows =
            sqlx::query_as::<_, AuctionRow>(&format!("{SELECT_AUCTION} ORDER BY created_at"))
                .fetch_all(&self.db)
                .await?;
        rows.into_iter().map(from_row).collect()
    }
}

/// In-memory store used by tests and driver-less development runs.
#[derive(Default)]
pub struct MemAuctionStore {
    items: RwLock<HashMap<Uuid, Auction>>,
}

#[async_trait]
impl AuctionStore for MemAuctionStore {
    async fn save(&self, mut auction: Auction) -> anyhow::Result<Auction> {
        let id = *auction.id.get_or_insert_with(Uuid::new_v4);
        self.items.write().await.insert(id, auction.clone());
        Ok(auction)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Auction>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Auction>> {
        Ok(self.items.read().await.values().cloned().collect())
    }
}
