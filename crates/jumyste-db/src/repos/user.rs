use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct UserRepo;

impl UserRepo {
    /// Insert a user and return the generated id.
    ///
    /// Returns `None` when the email is already taken. The check happens in
    /// the same statement as the insert, so concurrent registrations of one
    /// email cannot both succeed.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"INSERT INTO users (email, password_hash, name) VALUES ($1, $2, $3)
               ON CONFLICT (email) DO NOTHING
               RETURNING id"#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("Failed to create user")?;
        Ok(id)
    }

    pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by email")?;
        Ok(row)
    }

    pub async fn get_by_id(pool: &PgPool, id: i64) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by id")?;
        Ok(row)
    }
}
