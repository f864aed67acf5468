//! Registry records and lookup directions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::error::{RegistryError, Result};

/// Which column a lookup is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Key is a short id, the answer is its url
    IdToUrl,
    /// Key is a url, the answer is its short id
    UrlToId,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::IdToUrl, Direction::UrlToId];

    /// Column the key is matched against
    pub fn column(self) -> &'static str {
        match self {
            Self::IdToUrl => "id",
            Self::UrlToId => "original_url",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdToUrl => "id_to_url",
            Self::UrlToId => "url_to_id",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One id↔url mapping with its lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Entry {
    /// Decode a `urls` row (`id, original_url, created_at, expires_at`).
    pub(crate) fn from_row(row: &AnyRow) -> Result<Self> {
        let created_at: i64 = row.try_get("created_at")?;
        let expires_at: i64 = row.try_get("expires_at")?;

        Ok(Self {
            id: row.try_get("id")?,
            url: row.try_get("original_url")?,
            created_at: from_unix(created_at, "created_at")?,
            expires_at: from_unix(expires_at, "expires_at")?,
        })
    }

    /// An entry is gone from `expires_at` onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Unix seconds to a UTC timestamp, rejecting values chrono cannot represent.
pub(crate) fn from_unix(secs: i64, column: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| RegistryError::decode(format!("{} out of range: {}", column, secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(expires_at: DateTime<Utc>) -> Entry {
        Entry {
            id: "abc123".to_string(),
            url: "http://example.com".to_string(),
            created_at: expires_at - Duration::days(7),
            expires_at,
        }
    }

    #[test]
    fn test_entry_not_expired() {
        let entry = entry(Utc::now() + Duration::seconds(60));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expired() {
        let entry = entry(Utc::now() - Duration::seconds(1));
        assert!(entry.is_expired());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let deadline = Utc::now();
        let entry = entry(deadline);
        assert!(entry.is_expired_at(deadline));
        assert!(!entry.is_expired_at(deadline - Duration::seconds(1)));
    }

    #[test]
    fn direction_columns() {
        assert_eq!(Direction::IdToUrl.column(), "id");
        assert_eq!(Direction::UrlToId.column(), "original_url");
        assert_eq!(Direction::UrlToId.to_string(), "url_to_id");
    }

    #[test]
    fn from_unix_rejects_out_of_range() {
        assert!(from_unix(0, "created_at").is_ok());
        let err = from_unix(i64::MAX, "expires_at").unwrap_err();
        assert!(matches!(err, RegistryError::Decode { .. }));
    }
}
