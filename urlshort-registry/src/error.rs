//! Structured error types for the registry.
//!
//! Every `sqlx::Error` raised by the backing store is classified once, in
//! [`RegistryError::from_sqlx`], so callers can branch on the kind of failure
//! without inspecting driver-specific codes.

use thiserror::Error;

/// Main error type for registry operations
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Store configuration could not be loaded or is invalid
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Store unreachable, misconfigured, or the pool is already closed
    #[error("Connectivity error: {source}")]
    Connectivity {
        #[source]
        source: sqlx::Error,
    },

    /// Duplicate id or url rejected by the store's unique constraints.
    /// The store's own message is kept as the source.
    #[error("Constraint violation: {source}")]
    Conflict {
        #[source]
        source: sqlx::Error,
    },

    /// Query, exec, or transaction failure; the transaction was rolled back
    #[error("Store error: {source}")]
    Store {
        #[source]
        source: sqlx::Error,
    },

    /// Malformed row data
    #[error("Decode error: {reason}")]
    Decode { reason: String },
}

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

impl RegistryError {
    /// Classify a driver error into the registry taxonomy.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict { source: err },
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::AnyDriverError(_) => Self::Connectivity { source: err },
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. } => Self::Decode {
                reason: err.to_string(),
            },
            _ => Self::Store { source: err },
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a decode error
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// True for duplicate id/url rejections.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// True once the pool has been closed by shutdown.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            Self::Connectivity {
                source: sqlx::Error::PoolClosed
            }
        )
    }

    /// True when the store cannot be reached, including after shutdown.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. } | Self::Config { .. })
    }
}

impl From<sqlx::Error> for RegistryError {
    fn from(err: sqlx::Error) -> Self {
        Self::from_sqlx(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::config("max_open_conns must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: max_open_conns must be at least 1"
        );

        let err = RegistryError::decode("expires_at out of range");
        assert!(err.to_string().contains("Decode error"));
    }

    #[test]
    fn pool_closed_is_connectivity() {
        let err: RegistryError = sqlx::Error::PoolClosed.into();
        assert!(err.is_connectivity());
        assert!(!err.is_conflict());
    }

    #[test]
    fn pool_timeout_is_connectivity() {
        let err = RegistryError::from_sqlx(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, RegistryError::Connectivity { .. }));
    }

    #[test]
    fn only_pool_closed_counts_as_closed() {
        assert!(RegistryError::from_sqlx(sqlx::Error::PoolClosed).is_closed());
        assert!(!RegistryError::from_sqlx(sqlx::Error::PoolTimedOut).is_closed());
        assert!(!RegistryError::config("bad").is_closed());
    }

    #[test]
    fn missing_row_is_store_error() {
        let err = RegistryError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, RegistryError::Store { .. }));
    }

    #[test]
    fn missing_column_is_decode_error() {
        let err = RegistryError::from_sqlx(sqlx::Error::ColumnNotFound("expires_at".into()));
        assert!(matches!(err, RegistryError::Decode { .. }));
        assert!(err.to_string().contains("expires_at"));
    }
}
