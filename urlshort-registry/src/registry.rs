//! Registry - the single gateway for reads and writes of the id→url mapping
//!
//! - find: expiry enforced on read, expired rows deleted in-line
//! - register: one INSERT in one transaction, no check-then-insert;
//!   the store's unique constraints decide conflicts
//! - every mutation runs in a transaction; dropping an uncommitted
//!   transaction rolls it back

use std::sync::Mutex;

use chrono::Utc;
use sqlx::{AnyPool, Executor};

use crate::config::{DatabaseConfig, RegistryOptions};
use crate::entry::{from_unix, Direction, Entry};
use crate::error::Result;
use crate::migrations;
use crate::pool;
use crate::sweeper::{self, Sweeper};

const INSERT_SQL: &str =
    "INSERT INTO urls (id, original_url, created_at, expires_at) VALUES ($1, $2, $3, $4)";

/// Only deletes while the row is still expired, so a fresh registration that
/// reused the id after a sweep is left alone.
const DELETE_EXPIRED_SQL: &str = "DELETE FROM urls WHERE id = $1 AND expires_at <= $2";

fn lookup_sql(direction: Direction) -> &'static str {
    match direction {
        Direction::IdToUrl => {
            "SELECT id, original_url, created_at, expires_at FROM urls WHERE id = $1"
        }
        Direction::UrlToId => {
            "SELECT id, original_url, created_at, expires_at FROM urls WHERE original_url = $1"
        }
    }
}

/// Expiring id→url registry backed by a pooled store
///
/// Shared between request handlers behind an `Arc`. A background
/// [`Sweeper`] runs for as long as the registry is open.
///
/// # Example
///
/// ```rust,no_run
/// use urlshort_registry::{DatabaseConfig, Direction, Registry, RegistryOptions};
///
/// # async fn demo() -> urlshort_registry::Result<()> {
/// let config = DatabaseConfig::load()?;
/// let registry = Registry::connect(&config, RegistryOptions::new(7)).await?;
///
/// registry.register("abc123", "http://example.com").await?;
/// let entry = registry.find(Direction::IdToUrl, "abc123").await?;
/// assert_eq!(entry.map(|e| e.url).as_deref(), Some("http://example.com"));
///
/// registry.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct Registry {
    pool: AnyPool,
    ttl_seconds: i64,
    sweeper: Mutex<Option<Sweeper>>,
}

impl Registry {
    /// Open with the store config at `res/db_config.toml`.
    pub async fn open(ttl_days: u32) -> Result<Self> {
        let config = DatabaseConfig::load()?;
        Self::connect(&config, RegistryOptions::new(ttl_days)).await
    }

    /// Connect, verify the store, prepare lookups, and start the sweeper.
    ///
    /// Nothing is left running if any step fails.
    pub async fn connect(config: &DatabaseConfig, options: RegistryOptions) -> Result<Self> {
        tracing::info!(
            target_db = %config.target(),
            ttl_days = options.ttl_days,
            "Opening registry"
        );

        options.validate()?;

        let pool = pool::create_pool(config).await?;
        if let Err(e) = prepare(&pool).await {
            pool.close().await;
            return Err(e);
        }

        let sweeper = Sweeper::spawn(pool.clone(), options.effective_sweep_interval());

        Ok(Self {
            pool,
            ttl_seconds: options.ttl_seconds(),
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Look up an entry by id or by url.
    ///
    /// Returns `Ok(None)` both when nothing matches and when the match has
    /// expired; an expired match is deleted before returning.
    pub async fn find(&self, direction: Direction, key: &str) -> Result<Option<Entry>> {
        // Key columns are unique: at most one row
        let rows = sqlx::query(lookup_sql(direction))
            .bind(key)
            .fetch_all(&self.pool)
            .await?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let entry = Entry::from_row(row)?;

        let now = Utc::now();
        if entry.is_expired_at(now) {
            tracing::info!(id = %entry.id, url = %entry.url, "Deleting expired entry");
            delete_expired(&self.pool, &entry.id, now.timestamp()).await?;
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// Insert a new mapping expiring `ttl_seconds` from now.
    ///
    /// Does not look for an existing id or url first. A duplicate surfaces
    /// as [`RegistryError::Conflict`](crate::RegistryError::Conflict).
    pub async fn register(&self, id: &str, url: &str) -> Result<Entry> {
        let created_at = Utc::now().timestamp();
        let expires_at = created_at.saturating_add(self.ttl_seconds);
        // Decode before writing so an unrepresentable expiry never reaches the store
        let entry = Entry {
            id: id.to_owned(),
            url: url.to_owned(),
            created_at: from_unix(created_at, "created_at")?,
            expires_at: from_unix(expires_at, "expires_at")?,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(INSERT_SQL)
            .bind(id)
            .bind(url)
            .bind(created_at)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(id, url, expires_at, "Registered entry");

        Ok(entry)
    }

    /// Run one sweep now, returning how many entries were deleted.
    pub async fn sweep_expired(&self) -> Result<u64> {
        sweeper::sweep(&self.pool).await
    }

    /// Stop the sweeper and close the pool.
    ///
    /// Cached statements are finalized with their connections. Any later
    /// `find` or `register` fails with a connectivity error.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down registry...");

        if let Some(sweeper) = self.take_sweeper() {
            sweeper.stop().await;
        }

        tracing::debug!(
            connections = self.pool.size(),
            "Closing pool; cached statements are released with their connections"
        );
        self.pool.close().await;
        tracing::info!("Registry successfully shut down");
    }

    fn take_sweeper(&self) -> Option<Sweeper> {
        match self.sweeper.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        // Dropped without shutdown(): stop the sweeper so it does not outlive us
        if let Some(sweeper) = self.take_sweeper() {
            sweeper.cancel();
        }
    }
}

/// Create the schema and prepare both lookups once, so a broken schema fails
/// construction instead of the first request.
async fn prepare(pool: &AnyPool) -> Result<()> {
    migrations::run(pool).await?;

    let mut conn = pool.acquire().await?;
    for direction in Direction::ALL {
        (&mut *conn).prepare(lookup_sql(direction)).await?;
    }

    Ok(())
}

/// Delete `id` if it is still expired at `now`, in its own transaction.
///
/// Idempotent - returns `Ok(false)` when the row is already gone.
pub(crate) async fn delete_expired(pool: &AnyPool, id: &str, now: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(DELETE_EXPIRED_SQL)
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_key_on_the_right_column() {
        for direction in Direction::ALL {
            let sql = lookup_sql(direction);
            assert!(sql.ends_with(&format!("WHERE {} = $1", direction.column())));
        }
    }

    #[test]
    fn lookups_use_equality_not_pattern_match() {
        for direction in Direction::ALL {
            assert!(!lookup_sql(direction).contains("LIKE"));
        }
    }
}
