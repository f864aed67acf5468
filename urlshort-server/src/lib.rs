//! urlshort-server: HTTP API over the url registry
//!
//! Registers urls under six-character ids and redirects ids back to their
//! urls. Storage, expiry and uniqueness live in `urlshort-registry`.

pub mod error;
pub mod extractors;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, run_server, serve, ServerConfig, ServerError};
pub use state::AppState;
