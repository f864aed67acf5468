//! Validation error types

use std::fmt;

/// Why a registration request was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Target is not an absolute URL
    InvalidUrl { url: String },

    /// Custom id is not exactly the required length
    InvalidIdLength { id: String, len: usize, expected: usize },

    /// Custom id contains something other than letters, digits, `_` or `-`
    ForbiddenCharacters { id: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { url } => write!(f, "Invalid url: {}", url),
            Self::InvalidIdLength { id, len, expected } => write!(
                f,
                "Invalid ID length: {} is {} character long. It should be exactly {} characters long",
                id, len, expected
            ),
            Self::ForbiddenCharacters { id } => write!(
                f,
                "ID contains forbidden characters: {}. Allowed characters: alphanumeric characters, underscore and dash",
                id
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
