use crate::auth::TokenVerifier;
use crate::config::ServerConfig;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<ServerConfig>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    /// Create a new app state; the token verifier is built from `config.jwt`.
    pub fn new(pool: PgPool, config: ServerConfig) -> Self {
        let verifier = TokenVerifier::from_config(&config.jwt);
        Self {
            pool,
            config: Arc::new(config),
            verifier: Arc::new(verifier),
        }
    }
}
