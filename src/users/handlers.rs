use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::state::AppState;

use super::dto::{AuthResponse, LoginRequest, RegisterRequest};
use super::model::User;
use super::service::IdentityError;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/:id", get(get_user))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();
    info!(username = %payload.username, email = %payload.email, "register endpoint called");

    if payload.username.is_empty() {
        return Ok(Json(AuthResponse::failure("Username is required")));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Ok(Json(AuthResponse::failure("Invalid email")));
    }
    if payload.password.is_empty() {
        return Ok(Json(AuthResponse::failure("Password is required")));
    }

    match state.users.register(payload).await {
        Ok(user) => {
            info!(user_id = ?user.id, "user created");
            Ok(Json(AuthResponse::success("Registration successful", user)))
        }
        Err(err @ IdentityError::Duplicate(_)) => {
            warn!(error = %err, "registration rejected");
            Ok(Json(AuthResponse::failure(err.to_string())))
        }
        Err(err) => {
            error!(error = %err, "register failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    match state.users.login(&payload.username, &payload.password).await {
        Ok(user) => Ok(Json(AuthResponse::success("Login successful", user))),
        Err(IdentityError::InvalidCredentials) => {
            warn!(identifier = %payload.username, "login rejected");
            Ok(Json(AuthResponse::failure("Invalid credentials")))
        }
        Err(err) => {
            error!(error = %err, "login failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, (StatusCode, String)> {
    match state.users.get(id).await.map_err(internal)? {
        Some(user) => Ok(Json(user)),
        None => Err((StatusCode::NOT_FOUND, "User not found".into())),
    }
}

fn internal<E: std::error::Error>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
