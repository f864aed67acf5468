//! Request models, validated at construction
//!
//! Invalid input returns ValidationError, not panic.

pub mod payload;
pub mod short_id;
pub mod target_url;
pub mod validation;

pub use payload::{RegisterRequest, UrlPayload};
pub use short_id::{ShortId, SHORT_ID_LEN};
pub use target_url::TargetUrl;
pub use validation::ValidationError;
