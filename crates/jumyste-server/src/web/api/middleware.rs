use crate::auth::TokenError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;

/// The authenticated caller, attached to request extensions by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": message}))).into_response()
}

/// Rejects requests without a valid bearer token.
///
/// On success the verified [`AuthUser`] is inserted into the request
/// extensions for downstream handlers.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match req.headers().get(header::AUTHORIZATION) {
        None => return unauthorized("Authorization header required"),
        Some(val) if val.as_bytes().trim_ascii().is_empty() => {
            return unauthorized("Authorization header required");
        }
        Some(val) => match val.to_str() {
            Ok(t) => t,
            Err(_) => {
                tracing::debug!("Rejected non-ASCII authorization header");
                return unauthorized("Invalid or expired token");
            }
        },
    };

    // The verifier strips the `Bearer ` prefix itself
    match state.verifier.verify(token) {
        Ok(claims) => {
            req.extensions_mut().insert(AuthUser {
                user_id: claims.user_id,
            });
            next.run(req).await
        }
        Err(e) => {
            match e {
                TokenError::ExpiredToken => tracing::debug!("Rejected expired token"),
                TokenError::InvalidToken => tracing::debug!("Rejected invalid token"),
            }
            unauthorized("Invalid or expired token")
        }
    }
}

/// Extractor for handlers mounted behind [`require_auth`].
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| unauthorized("Authorization header required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::create_access_token_at;
    use crate::config::{DbConfig, HttpConfig, JwtConfig, ServerConfig};
    use axum::{Router, body::Body, middleware::from_fn_with_state, routing::get};
    use http::Request as HttpRequest;
    use http_body_util::BodyExt;
    use sqlx::PgPool;
    use tower::ServiceExt;

    const SECRET: &str = "s3cret";

    fn test_state() -> Arc<AppState> {
        let config = ServerConfig {
            server: HttpConfig::default(),
            database: DbConfig {
                host: "invalid".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                name: "db".to_string(),
                sslmode: "disable".to_string(),
            },
            jwt: JwtConfig {
                secret: SECRET.to_string(),
                access_token_ttl_secs: 3600,
            },
        };
        let pool = PgPool::connect_lazy("postgres://invalid:5432/db").unwrap();
        Arc::new(AppState::new(pool, config))
    }

    async fn whoami(user: AuthUser) -> impl IntoResponse {
        Json(json!({"user_id": user.user_id}))
    }

    fn test_router() -> Router {
        let state = test_state();
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    fn request(auth: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().method("GET").uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn fresh_token(user_id: i64, secret: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        create_access_token_at(user_id, secret.as_bytes(), now, 3600).unwrap()
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let response = test_router().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Authorization header required");
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let token = fresh_token(42, SECRET);
        let response = test_router()
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user_id"], 42);
    }

    #[tokio::test]
    async fn test_token_without_bearer_prefix_is_accepted() {
        let token = fresh_token(9, SECRET);
        let response = test_router().oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user_id"], 9);
    }

    #[tokio::test]
    async fn test_invalid_and_expired_share_one_response() {
        let wrong_secret = fresh_token(42, "wrong-secret");
        let now = chrono::Utc::now().timestamp();
        let expired =
            create_access_token_at(42, SECRET.as_bytes(), now - 7200, 3600).unwrap();

        for token in [wrong_secret, expired, "garbage".to_string()] {
            let response = test_router()
                .oneshot(request(Some(&format!("Bearer {}", token))))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = body_json(response).await;
            assert_eq!(body["error"], "Invalid or expired token");
        }
    }

    #[tokio::test]
    async fn test_doubled_bearer_prefix_is_rejected() {
        let token = fresh_token(42, SECRET);
        let response = test_router()
            .oneshot(request(Some(&format!("Bearer Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_non_ascii_header_is_invalid_not_missing() {
        let request = HttpRequest::builder()
            .method("GET")
            .uri("/whoami")
            .header("Authorization", &b"Bearer \xfftoken"[..])
            .body(Body::empty())
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_blank_header_counts_as_missing() {
        let response = test_router().oneshot(request(Some("   "))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Authorization header required");
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_rejects() {
        let router = Router::new().route("/whoami", get(whoami));
        let response = router.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
