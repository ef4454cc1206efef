pub mod auth;
pub mod middleware;
pub mod users;

use crate::state::AppState;
use axum::response::IntoResponse;
use axum::{Json, Router, middleware::from_fn_with_state, routing::get, routing::post};
use serde_json::json;
use std::sync::Arc;

/// GET /api/health
async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    // Everything in here sits behind the bearer-token middleware
    let protected = Router::new()
        .route("/users/me", get(users::me))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}
