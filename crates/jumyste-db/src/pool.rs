use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::migrate::Migrate;

/// Create a PostgreSQL connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPool::connect(database_url).await?;
    Ok(pool)
}

/// Run database migrations.
///
/// Returns the number of migrations that were pending and are now applied.
pub async fn run_migrations(pool: &PgPool) -> Result<usize> {
    let migrator = sqlx::migrate!("./migrations");

    let pending = {
        let mut conn = pool
            .acquire()
            .await
            .context("Failed to acquire connection for migrations")?;
        conn.ensure_migrations_table()
            .await
            .context("Failed to create migrations table")?;
        let applied = conn
            .list_applied_migrations()
            .await
            .context("Failed to list applied migrations")?;
        migrator
            .iter()
            .filter(|m| !m.migration_type.is_down_migration())
            .filter(|m| !applied.iter().any(|a| a.version == m.version))
            .count()
    };

    if pending == 0 {
        tracing::info!("No new migrations to apply");
        return Ok(0);
    }

    tracing::info!("Applying {} migration(s)...", pending);
    migrator.run(pool).await.context("Migration failed")?;
    tracing::info!("Migrations applied successfully");
    Ok(pending)
}
