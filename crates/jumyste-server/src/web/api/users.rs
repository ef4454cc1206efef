use crate::state::AppState;
use crate::web::api::middleware::AuthUser;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jumyste_common::models::auth::User;
use jumyste_db::UserRepo;
use serde_json::json;
use std::sync::Arc;

/// GET /api/users/me
#[tracing::instrument(skip(state))]
pub async fn me(State(state): State<Arc<AppState>>, auth: AuthUser) -> impl IntoResponse {
    match UserRepo::get_by_id(&state.pool, auth.user_id).await {
        Ok(Some(row)) => Json(User {
            user_id: row.id,
            email: row.email,
            name: row.name,
            created_at: row.created_at,
        })
        .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "User not found"})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to get user: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}
