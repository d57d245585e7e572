use serde::Serialize;
use uuid::Uuid;

/// User record. `profile` carries any extra registration fields verbatim;
/// this service never interprets them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<Uuid>,          // store-assigned on first save
    pub username: String,          // unique, checked at registration
    pub email: String,             // unique, checked at registration
    #[serde(skip_serializing)]
    pub password_hash: String,     // never exposed in JSON
    #[serde(flatten)]
    pub profile: serde_json::Value,
    pub created_at: i64,           // epoch milliseconds
}
