use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use jumyste_common::models::auth::Claims;
use thiserror::Error;

use crate::config::JwtConfig;

/// Signing algorithm for all access tokens.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a bearer token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Malformed token, bad signature, or unexpected algorithm.
    #[error("invalid token")]
    InvalidToken,
    /// Signature is valid but the expiry has elapsed.
    #[error("token is expired")]
    ExpiredToken,
}

/// Strip an optional `Bearer ` prefix from an Authorization header value.
pub fn strip_bearer(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value)
}

/// Verifies HS256 access tokens against a fixed secret.
///
/// Holds no mutable state; a single instance is shared across all requests.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is checked in `verify_at` against an explicit instant, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(config.secret.as_bytes())
    }

    /// Verify `token` against the current wall-clock time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify `token` as of the unix timestamp `now`.
    ///
    /// A `Bearer ` prefix is tolerated. The token is accepted only when the
    /// signature checks out and `exp` is strictly after `now`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let token = strip_bearer(token.trim());
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
                _ => TokenError::InvalidToken,
            },
        )?;

        if data.claims.is_expired_at(now) {
            return Err(TokenError::ExpiredToken);
        }
        Ok(data.claims)
    }

    /// Verify `token` and return only the user identifier.
    pub fn verify_user_id(&self, token: &str) -> Result<i64, TokenError> {
        self.verify(token).map(|claims| claims.user_id)
    }
}

/// One-shot verification: `secret` in, user id or a typed rejection out.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<i64, TokenError> {
    TokenVerifier::new(secret).verify_user_id(token)
}

/// Create a signed access token for `user_id`, issued at `issued_at`.
pub fn create_access_token_at(
    user_id: i64,
    secret: &[u8],
    issued_at: i64,
    ttl_secs: i64,
) -> Result<String> {
    let claims = Claims::new(user_id, issued_at, ttl_secs)
        .with_context(|| format!("Token lifetime of {}s overflows the expiry", ttl_secs))?;
    jsonwebtoken::encode(
        &Header::new(TOKEN_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .context("Failed to create access token")
}

/// Create an access token (JWT) for `user_id` using the configured TTL
pub fn create_access_token(user_id: i64, config: &JwtConfig) -> Result<String> {
    create_access_token_at(
        user_id,
        config.secret.as_bytes(),
        chrono::Utc::now().timestamp(),
        config.access_token_ttl_secs,
    )
}

/// Hash a password using argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
