//! Short url endpoints
//!
//! - `GET /api/urls/{id}` redirects to the registered url
//! - `POST /api/urls` registers a url under a given or derived id

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use urlshort_registry::{Direction, Registry};

use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::models::{RegisterRequest, ShortId, TargetUrl, UrlPayload};
use crate::state::AppState;

/// GET /api/urls/{id} - 308 to the target, 404 when unknown or expired
async fn get_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let entry = state
        .registry()
        .find(Direction::IdToUrl, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound { id: id.clone() })?;

    tracing::debug!(id = %entry.id, url = %entry.url, "Redirecting");
    let location = location_for(&entry.url)?;
    Ok((StatusCode::PERMANENT_REDIRECT, [(header::LOCATION, location)]).into_response())
}

/// POST /api/urls - register a url
async fn add_url(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Response, ApiError> {
    let registry = state.registry();

    let url = TargetUrl::parse(&req.url).map_err(|e| ApiError::validation(&req.id, &req.url, e))?;
    let requested = if req.id.is_empty() {
        None
    } else {
        Some(ShortId::parse(&req.id).map_err(|e| ApiError::validation(&req.id, &req.url, e))?)
    };

    if let Some(existing) = registry.find(Direction::UrlToId, url.as_str()).await? {
        return Err(ApiError::url_taken(url.as_str(), &existing.id));
    }

    let id = requested.unwrap_or_else(|| ShortId::derive(&url));

    if let Some(existing) = registry.find(Direction::IdToUrl, id.as_str()).await? {
        return Err(ApiError::id_taken(id.as_str(), &existing.url));
    }

    match registry.register(id.as_str(), url.as_str()).await {
        Ok(entry) => {
            tracing::info!(id = %entry.id, url = %entry.url, "Registered url");
            let location = HeaderValue::from_str(&id.path()).map_err(|e| ApiError::Internal {
                message: format!("location for id {}: {}", id.as_str(), e),
            })?;
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(UrlPayload::from(entry)),
            )
                .into_response())
        }
        Err(e) if e.is_conflict() => Err(lost_race(registry, &id, &url).await?),
        Err(e) => Err(e.into()),
    }
}

/// Preflight - CORS headers are added by the router's layer
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Another writer claimed the id or the url between our checks and the insert.
async fn lost_race(registry: &Registry, id: &ShortId, url: &TargetUrl) -> Result<ApiError, ApiError> {
    tracing::debug!(id = %id.as_str(), url = %url.as_str(), "Lost registration race");

    if let Some(existing) = registry.find(Direction::IdToUrl, id.as_str()).await? {
        return Ok(ApiError::id_taken(id.as_str(), &existing.url));
    }
    if let Some(existing) = registry.find(Direction::UrlToId, url.as_str()).await? {
        return Ok(ApiError::url_taken(url.as_str(), &existing.id));
    }

    Ok(ApiError::Conflict {
        id: id.as_str().to_owned(),
        url: url.as_str().to_owned(),
        message: format!("ID {} or url {} was registered concurrently", id.as_str(), url.as_str()),
    })
}

/// Stored url as a Location header, falling back to its ASCII
/// serialization (IDNA host, percent-encoded path) when needed.
fn location_for(raw: &str) -> Result<HeaderValue, ApiError> {
    if let Ok(value) = HeaderValue::from_str(raw) {
        return Ok(value);
    }

    let serialized = url::Url::parse(raw)
        .map(String::from)
        .map_err(|e| ApiError::Internal {
            message: format!("stored url {} does not parse: {}", raw, e),
        })?;
    HeaderValue::from_str(&serialized).map_err(|e| ApiError::Internal {
        message: format!("stored url {} is not a valid Location: {}", raw, e),
    })
}

/// Url routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/urls", post(add_url).options(preflight))
        .route("/api/urls/{id}", get(get_url).options(preflight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_ascii_serialization() {
        let value = location_for("http://example.com/ä?q=ü").unwrap();
        assert_eq!(value.to_str().unwrap(), "http://example.com/%C3%A4?q=%C3%BC");
    }

    #[test]
    fn location_keeps_plain_urls() {
        let value = location_for("https://www.rust-lang.org/learn").unwrap();
        assert_eq!(value, "https://www.rust-lang.org/learn");
    }
}
