use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// When unset the service runs against the in-memory store.
    pub database_url: Option<String>,
    /// Password scheme name: "fold" (default) or "argon2".
    pub password_scheme: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            password_scheme: std::env::var("PASSWORD_SCHEME").unwrap_or_else(|_| "fold".into()),
        })
    }

    pub fn test_defaults() -> Self {
        Self {
            database_url: None,
            password_scheme: "fold".into(),
        }
    }
}
