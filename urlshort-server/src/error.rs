//! API error types with IntoResponse
//!
//! Every error body has the same `{id, url, error}` shape as a success.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use urlshort_registry::RegistryError;

use crate::models::{UrlPayload, ValidationError};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Body was not the JSON we expect (400)
    BadRequest { message: String },

    /// Request fields failed validation (400)
    Validation {
        id: String,
        url: String,
        error: ValidationError,
    },

    /// No live entry under this id (404)
    NotFound { id: String },

    /// Id or url already taken (409)
    Conflict {
        id: String,
        url: String,
        message: String,
    },

    /// Registry failure (500, logged)
    Registry(RegistryError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn validation(id: &str, url: &str, error: ValidationError) -> Self {
        Self::Validation {
            id: id.to_owned(),
            url: url.to_owned(),
            error,
        }
    }

    /// The url is live under another id.
    pub fn url_taken(url: &str, existing_id: &str) -> Self {
        Self::Conflict {
            id: existing_id.to_owned(),
            url: url.to_owned(),
            message: format!("Url {} already registered under id {}", url, existing_id),
        }
    }

    /// The id is live for another url.
    pub fn id_taken(id: &str, existing_url: &str) -> Self {
        Self::Conflict {
            id: id.to_owned(),
            url: existing_url.to_owned(),
            message: format!("ID {} already registered for url {}", id, existing_url),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, UrlPayload::error("", "", message))
            }
            Self::Validation { id, url, error } => (
                StatusCode::BAD_REQUEST,
                UrlPayload::error(id, url, error.to_string()),
            ),
            Self::NotFound { id } => {
                let message = format!("ID {} does not exist", id);
                (StatusCode::NOT_FOUND, UrlPayload::error(id, "", message))
            }
            Self::Conflict { id, url, message } => {
                (StatusCode::CONFLICT, UrlPayload::error(id, url, message))
            }
            Self::Registry(e) => {
                // Log the actual error, return generic message
                tracing::error!(error = %e, "Registry error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    UrlPayload::error("", "", "an internal error occurred"),
                )
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    UrlPayload::error("", "", "an internal error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> UrlPayload {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::validation(
            "abc",
            "http://a.example",
            ValidationError::InvalidIdLength {
                id: "abc".into(),
                len: 3,
                expected: 6,
            },
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert_eq!(body.id, "abc");
        assert_eq!(body.url, "http://a.example");
        assert!(body.error.starts_with("Invalid ID length"));
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let response = ApiError::NotFound { id: "nope00".into() }.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_of(response).await,
            UrlPayload::error("nope00", "", "ID nope00 does not exist")
        );
    }

    #[tokio::test]
    async fn conflicts_are_409() {
        let response = ApiError::id_taken("cranki", "http://testurl.com").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_of(response).await.error,
            "ID cranki already registered for url http://testurl.com"
        );

        let response = ApiError::url_taken("http://testurl.com", "cranki").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_of(response).await.id, "cranki");
    }

    #[tokio::test]
    async fn registry_error_is_500_without_details() {
        let err = ApiError::from(RegistryError::decode("bad timestamp in expires_at"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await.error, "an internal error occurred");
    }
}
