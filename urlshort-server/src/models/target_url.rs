//! Target url validation

use super::ValidationError;

/// Absolute url a short id redirects to.
///
/// The client's spelling is kept as-is; it is what gets stored and matched,
/// so `http://a.example` and `http://a.example/` stay distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetUrl(String);

impl TargetUrl {
    /// Accept anything that parses as an absolute URL.
    ///
    /// Stricter than a request-URI check: absolute paths such as
    /// `/just/a/path` have no scheme and are rejected.
    ///
    /// # Example
    /// ```
    /// use urlshort_server::models::TargetUrl;
    ///
    /// assert!(TargetUrl::parse("https://example.com/a?b=c").is_ok());
    /// assert!(TargetUrl::parse("example.com").is_err()); // no scheme
    /// assert!(TargetUrl::parse("").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match url::Url::parse(s) {
            Ok(_) => Ok(Self(s.to_owned())),
            Err(_) => Err(ValidationError::InvalidUrl { url: s.to_owned() }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TargetUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
