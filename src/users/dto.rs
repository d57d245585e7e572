use serde::{Deserialize, Serialize};

use super::model::User;

/// Request body for registration. Unrecognized fields are kept as opaque
/// profile data, not rejected.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: serde_json::Value,
}

/// Request body for login. `username` also accepts an email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Envelope returned by register and login. Always HTTP 200; the `success`
/// flag carries the outcome.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: Option<User>,
}

impl AuthResponse {
    pub fn success(message: impl Into<String>, user: User) -> Self {
        Self {
            success: true,
            message: message.into(),
            user: Some(user),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            user: None,
        }
    }
}
