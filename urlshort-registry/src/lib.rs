//! # urlshort-registry
//!
//! Expiring id→url registry over a pooled SQL store.
//!
//! - [`Registry::find`] looks up by id or by url and hides expired entries,
//!   deleting them on the way
//! - [`Registry::register`] inserts in one transaction and leaves uniqueness
//!   to the store's constraints
//! - a background sweeper deletes expired entries every sweep interval
//! - [`Registry::shutdown`] stops the sweeper and closes the pool
//!
//! ```rust,no_run
//! use urlshort_registry::{Direction, Registry};
//!
//! # async fn demo() -> urlshort_registry::Result<()> {
//! // Reads res/db_config.toml; entries live for 7 days
//! let registry = Registry::open(7).await?;
//!
//! registry.register("abc123", "http://example.com").await?;
//! if let Some(entry) = registry.find(Direction::UrlToId, "http://example.com").await? {
//!     println!("{} -> {}", entry.id, entry.url);
//! }
//!
//! registry.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod migrations;
pub mod pool;
mod registry;
mod sweeper;

pub use config::{DatabaseConfig, RegistryOptions, DEFAULT_CONFIG_PATH, DEFAULT_TTL_DAYS};
pub use entry::{Direction, Entry};
pub use error::{RegistryError, Result};
pub use registry::Registry;
