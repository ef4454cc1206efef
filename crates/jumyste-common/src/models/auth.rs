use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User model (safe for client responses -- no password_hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// JWT claims carried by access tokens.
///
/// `exp` and `iat` are unix timestamps in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Build claims for `user_id` issued at `issued_at`, valid for `ttl_secs`.
    ///
    /// Returns `None` when the expiry does not fit in an `i64`.
    pub fn new(user_id: i64, issued_at: i64, ttl_secs: i64) -> Option<Self> {
        Some(Self {
            user_id,
            iat: issued_at,
            exp: issued_at.checked_add(ttl_secs)?,
        })
    }

    /// True once `now` has reached the expiry timestamp.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}
