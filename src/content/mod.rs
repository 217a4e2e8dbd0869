//! Content resolution service
//!
//! The content server resolves URNs to their active deployments and serves the
//! content-addressed files those deployments reference. The composer only ever
//! talks to it through the [`ContentService`] trait so tests and alternative
//! transports can stand in for the HTTP client.

use async_trait::async_trait;
use bytes::Bytes;

pub mod client;
pub mod types;

pub use client::HttpContentClient;
pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid content server URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Content not found: {locator}")]
    NotFound { locator: String },
}

pub type ContentResult<T> = Result<T, ContentError>;

/// Remote store of entity metadata and content files
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Resolve a batch of URNs to their active entities. Unknown URNs are
    /// simply absent from the result.
    async fn resolve_active_entities(&self, urns: &[String]) -> ContentResult<Vec<EntityMetadata>>;

    /// Download one content file by its locator (content hash)
    async fn fetch_content(&self, locator: &str) -> ContentResult<Bytes>;
}
