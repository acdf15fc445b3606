//! REST client for the alert definition service.
//!
//! [`HttpDefinitionStore`] implements [`DefinitionStore`] over the service's
//! `/definitions` endpoints so the editor can run against a remote backend.

use std::time::Duration;

use alertdesk_rules::schema::{AlertDefinition, DefinitionListing};
use alertdesk_rules::store::{DefinitionStore, StoreError, StoreResult};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

const LOAD_FAILED: &str = "Failed to load alert definitions.";
const SAVE_FAILED: &str = "Failed to save alert definition.";
const DELETE_FAILED: &str = "Failed to delete alert definition.";

/// Definition store backed by the definition service REST API.
pub struct HttpDefinitionStore {
    base_url: String,
    http: reqwest::Client,
}

/// Mutation responses come either bare or wrapped in `{"definition": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionResponse {
    Wrapped { definition: AlertDefinition },
    Bare(AlertDefinition),
}

impl DefinitionResponse {
    fn into_inner(self) -> AlertDefinition {
        match self {
            DefinitionResponse::Wrapped { definition } => definition,
            DefinitionResponse::Bare(definition) => definition,
        }
    }
}

/// Error body shape used by the service.
#[derive(Deserialize, Default)]
struct ErrorBody {
    message: Option<String>,
    description: Option<String>,
}

impl HttpDefinitionStore {
    /// Create a client for `base_url`. Trailing slashes are ignored.
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::transport(None, format!("failed to build HTTP client: {e}")))?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/definitions/{}", self.base_url, id),
            None => format!("{}/definitions", self.base_url),
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&AlertDefinition>,
        fallback: &str,
    ) -> StoreResult<Response> {
        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request.send().await.map_err(|e| {
            warn!(%method, url, error = %e, "definition service not reachable");
            StoreError::transport(None, fallback)
        })?;

        let status = resp.status();
        debug!(%method, url, status = status.as_u16(), "definition service responded");
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body
            .message
            .or(body.description)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        warn!(%method, url, status = status.as_u16(), %message, "definition service rejected request");
        Err(StoreError::transport(Some(status.as_u16()), message))
    }

    /// Decode a 2xx body. Unreadable or malformed bodies surface as `fallback`.
    async fn decode<T: DeserializeOwned>(resp: Response, fallback: &str) -> StoreResult<T> {
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| {
            warn!(status, error = %e, "failed to read definition service response");
            StoreError::transport(Some(status), fallback)
        })?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(status, error = %e, "definition service returned an unexpected body");
            StoreError::transport(Some(status), fallback)
        })
    }
}

#[async_trait::async_trait]
impl DefinitionStore for HttpDefinitionStore {
    async fn list(&self) -> StoreResult<DefinitionListing> {
        let resp = self.send(Method::GET, &self.url(None), None, LOAD_FAILED).await?;
        Self::decode(resp, LOAD_FAILED).await
    }

    async fn create(&self, definition: &AlertDefinition) -> StoreResult<AlertDefinition> {
        let resp = self
            .send(Method::POST, &self.url(None), Some(definition), SAVE_FAILED)
            .await?;
        let saved: DefinitionResponse = Self::decode(resp, SAVE_FAILED).await?;
        Ok(saved.into_inner())
    }

    async fn update(&self, id: &str, definition: &AlertDefinition) -> StoreResult<AlertDefinition> {
        let resp = self
            .send(Method::PUT, &self.url(Some(id)), Some(definition), SAVE_FAILED)
            .await?;
        let saved: DefinitionResponse = Self::decode(resp, SAVE_FAILED).await?;
        Ok(saved.into_inner())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.send(Method::DELETE, &self.url(Some(id)), None, DELETE_FAILED)
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}
