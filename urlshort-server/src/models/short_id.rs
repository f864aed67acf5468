//! Short id validation and derivation
//!
//! Ids are exactly six characters: letters, digits, underscores, dashes.
//! When a client does not pick one, the id is the last six hex digits of the
//! MD5 of the target url, so the same url always proposes the same id.

use super::{TargetUrl, ValidationError};

/// Required id length, in characters
pub const SHORT_ID_LEN: usize = 6;

/// Validated short id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortId(String);

impl ShortId {
    /// Validate a client-supplied id.
    ///
    /// # Example
    /// ```
    /// use urlshort_server::models::ShortId;
    ///
    /// assert!(ShortId::parse("abc_12").is_ok());
    /// assert!(ShortId::parse("abc").is_err());      // too short
    /// assert!(ShortId::parse("abc 12").is_err());   // space
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let len = s.chars().count();
        if len != SHORT_ID_LEN {
            return Err(ValidationError::InvalidIdLength {
                id: s.to_owned(),
                len,
                expected: SHORT_ID_LEN,
            });
        }

        if !s
            .chars()
            .all(|c| c.is_alphabetic() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(ValidationError::ForbiddenCharacters { id: s.to_owned() });
        }

        Ok(Self(s.to_owned()))
    }

    /// Id proposed for a url when the client supplies none.
    pub fn derive(url: &TargetUrl) -> Self {
        let hex = format!("{:x}", md5::compute(url.as_str().as_bytes()));
        Self(hex[hex.len() - SHORT_ID_LEN..].to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path the short url is served under, percent-encoded for headers.
    pub fn path(&self) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(self.0.as_bytes()).collect();
        format!("/{}", encoded)
    }
}

impl AsRef<str> for ShortId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
