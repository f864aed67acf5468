//! Schema for the `urls` table
//!
//! Portable across Postgres and SQLite: timestamps are unix seconds in
//! `BIGINT` columns, uniqueness comes from the primary key and a `UNIQUE`
//! constraint on `original_url`.

use sqlx::AnyPool;

use crate::error::Result;

/// Create the `urls` table and its expiry index if missing.
pub async fn run(pool: &AnyPool) -> Result<()> {
    tracing::debug!("Running registry migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS urls (
            id VARCHAR(64) PRIMARY KEY,
            original_url VARCHAR(2048) NOT NULL UNIQUE,
            created_at BIGINT NOT NULL,
            expires_at BIGINT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS urls_expires_at_idx ON urls (expires_at)")
        .execute(pool)
        .await?;

    tracing::debug!("Registry migrations complete");
    Ok(())
}
