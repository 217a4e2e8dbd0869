//! HTTP client for the content server
//!
//! Timeouts are owned here; the composer core never retries.

use super::{ContentError, ContentResult, ContentService, EntityMetadata};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("avatar-composer/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpContentClient {
    base_url: Url,
    http_client: reqwest::Client,
}

impl HttpContentClient {
    /// Create a client for a content server such as `https://peer.decentraland.org`
    pub fn new(base_url: &str, timeout: Duration) -> ContentResult<Self> {
        // Url::join drops the last path segment without a trailing slash
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ContentError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ContentError::HttpError(e.to_string()))?;

        info!("🌐 Content client using {}", base_url);

        Ok(Self { base_url, http_client })
    }

    fn endpoint(&self, path: &str) -> ContentResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ContentError::InvalidUrl(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl ContentService for HttpContentClient {
    async fn resolve_active_entities(&self, urns: &[String]) -> ContentResult<Vec<EntityMetadata>> {
        let url = self.endpoint("content/entities/active")?;
        let request_body = json!({ "pointers": urns });

        debug!("📋 Resolving {} pointers", urns.len());

        let response = self.http_client.post(url.clone())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ContentError::HttpError(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            warn!("❌ Entity resolution failed: HTTP {}", status);
            return Err(ContentError::Status { url: url.to_string(), status });
        }

        let entities: Vec<EntityMetadata> = response.json().await
            .map_err(|e| ContentError::ParseError(e.to_string()))?;

        info!("📦 Resolved {} of {} pointers", entities.len(), urns.len());
        Ok(entities)
    }

    async fn fetch_content(&self, locator: &str) -> ContentResult<Bytes> {
        let url = self.endpoint(&format!("content/contents/{}", locator))?;

        debug!("🔺 Requesting content: {}", locator);

        let response = self.http_client.get(url.clone())
            .send()
            .await
            .map_err(|e| ContentError::HttpError(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(ContentError::NotFound { locator: locator.to_string() });
        }
        if !(200..300).contains(&status) {
            warn!("❌ Failed to download content {}: HTTP {}", locator, status);
            return Err(ContentError::Status { url: url.to_string(), status });
        }

        let data = response.bytes().await
            .map_err(|e| ContentError::HttpError(e.to_string()))?;

        debug!("🔺 Downloaded content {}: {} bytes", locator, data.len());
        Ok(data)
    }
}
