//! Database connection pool management
//!
//! Uses the sqlx `Any` driver: Postgres in production, SQLite for tests and
//! local runs. The pool is sized from [`DatabaseConfig`].

use std::time::Duration;

use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::{AnyPool, Connection};

use crate::config::DatabaseConfig;
use crate::error::{RegistryError, Result};

/// Connections are recycled after an hour.
const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Create a connection pool and verify the store answers.
///
/// Any failure here is reported as [`RegistryError::Connectivity`] (or
/// [`RegistryError::Config`] for an invalid config), whatever the driver said.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&DatabaseConfig::for_url("postgres://localhost/urlshort")).await?;
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> Result<AnyPool> {
    config.validate()?;
    install_default_drivers();

    let url = config.connection_url()?;
    let pool = AnyPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.idle_conns())
        .max_lifetime(MAX_CONNECTION_LIFETIME)
        .connect(&url)
        .await
        .map_err(connectivity)?;

    if let Err(e) = ping(&pool).await {
        pool.close().await;
        return Err(e);
    }

    Ok(pool)
}

/// Round-trip a ping on one pooled connection.
pub async fn ping(pool: &AnyPool) -> Result<()> {
    let mut conn = pool.acquire().await.map_err(connectivity)?;
    conn.ping().await.map_err(connectivity)?;
    Ok(())
}

fn connectivity(source: sqlx::Error) -> RegistryError {
    RegistryError::Connectivity { source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sqlite_pool_pings() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("ping.db").display());
        let pool = create_pool(&DatabaseConfig::for_url(url)).await.unwrap();

        ping(&pool).await.unwrap();
        pool.close().await;
    }

    #[tokio::test]
    async fn unreachable_store_is_connectivity_error() {
        let dir = tempfile::tempdir().unwrap();
        // No mode=rwc and a missing parent directory: SQLite cannot open it
        let url = format!("sqlite://{}", dir.path().join("missing/links.db").display());
        let err = create_pool(&DatabaseConfig::for_url(url)).await.unwrap_err();

        assert!(matches!(err, RegistryError::Connectivity { .. }));
    }

    #[tokio::test]
    async fn unknown_scheme_is_connectivity_error() {
        let err = create_pool(&DatabaseConfig::for_url("nosuchdb://localhost/urls"))
            .await
            .unwrap_err();
        assert!(err.is_connectivity());
    }

    #[tokio::test]
    async fn ping_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("closed.db").display());
        let pool = create_pool(&DatabaseConfig::for_url(url)).await.unwrap();
        pool.close().await;

        let err = ping(&pool).await.unwrap_err();
        assert!(err.is_connectivity());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn postgres_pool_pings() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&DatabaseConfig::for_url(url))
            .await
            .expect("pool creation failed");
        ping(&pool).await.expect("ping failed");
    }
}
