use crate::auth::{create_access_token, hash_password, verify_password};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jumyste_db::UserRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Internal server error"})),
    )
        .into_response()
}

/// POST /api/auth/register
#[tracing::instrument(skip(state, req))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Email and password are required"})),
        )
            .into_response();
    }

    let password_hash = match hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to hash password: {:#}", e);
            return internal_error();
        }
    };

    match UserRepo::create(&state.pool, email, &password_hash, req.name.as_deref()).await {
        Ok(Some(user_id)) => {
            tracing::info!(user_id, "Registered user");
            (
                StatusCode::CREATED,
                Json(json!({"user_id": user_id, "email": email})),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::CONFLICT,
            Json(json!({"error": "Email already registered"})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to create user: {:#}", e);
            internal_error()
        }
    }
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let invalid_credentials = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        )
            .into_response()
    };

    let user = match UserRepo::get_by_email(&state.pool, req.email.trim()).await {
        Ok(Some(u)) => u,
        Ok(None) => return invalid_credentials(),
        Err(e) => {
            tracing::error!("DB error during login: {:#}", e);
            return internal_error();
        }
    };

    match verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            tracing::error!("Password verification error: {:#}", e);
            return internal_error();
        }
    }

    let jwt = &state.config.jwt;
    let access_token = match create_access_token(user.id, jwt) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create access token: {:#}", e);
            return internal_error();
        }
    };

    Json(TokenResponse {
        access_token,
        token_type: "Bearer",
        expires_in: jwt.access_token_ttl_secs,
    })
    .into_response()
}
