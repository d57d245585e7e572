use std::collections::HashMap;

use axum::async_trait;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::User;

/// Gateway for user records, with alternate-key lookups for the two fields
/// the identity manager treats as unique.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists the user, assigning a fresh id on first save.
    async fn save(&self, user: User) -> anyhow::Result<User>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    profile: serde_json::Value,
    created_at: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: Some(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            profile: row.profile,
            created_at: row.created_at,
        }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, username, email, password_hash, profile, created_at
    FROM users
"#;

#[async_trait]
impl UserStore for PgUserStore {
    async fn save(&self, mut user: User) -> anyhow::Result<User> {
        match user.id {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE users
                    SET username = $2, email = $3, password_hash = $4,
                        profile = $5, created_at = $6
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(&user.profile)
                .bind(user.created_at)
                .execute(&self.db)
                .await?;
            }
            None => {
                let id = Uuid::new_v4();
                sqlx::query(
                    r#"
                    INSERT INTO users (id, username, email, password_hash, profile, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(id)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(&user.profile)
                .bind(user.created_at)
                .execute(&self.db)
                .await?;
                user.id = Some(id);
            }
        }
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(User::from))
    }
}

/// In-memory store used by tests and driver-less development runs.
#[derive(Default)]
pub struct MemUserStore {
    items: RwLock<HashMap<Uuid, User>>,
}

impl MemUserStore {
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.items.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemUserStore {
    async fn save(&self, mut user: User) -> anyhow::Result<User> {
        let id = *user.id.get_or_insert_with(Uuid::new_v4);
        self.items.write().await.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}
