//! Authenticated client for the paginated remote collections
//!
//! Implements [`RemoteSource`] on top of [`HttpClient`]. Every request carries
//! a bearer token fetched from the injected [`AccessTokenProvider`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fieldsync_core::sync::pagination::page_offset;
use fieldsync_core::RemoteSource;
use fieldsync_domain::{Config, EntityType, PageEnvelope, RawRecord, Result as DomainResult};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::auth::AccessTokenProvider;
use super::errors::ApiError;
use super::types::{ApiEnvelope, DocumentsData, PageData};
use crate::http::{HttpClient, RetryPolicy};

/// Configuration for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL including any path prefix (e.g. `https://crm.example.com/api`)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Transport retry policy
    pub retry: RetryPolicy,
}

impl ApiClientConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.api.base_url.clone(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            retry: RetryPolicy::from(&config.retry),
        }
    }
}

/// Client for the field-sales API
pub struct ApiClient {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the base URL is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(
        config: ApiClientConfig,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("invalid API base URL {}: {e}", config.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "unsupported API URL scheme: {}",
                parsed.scheme()
            )));
        }

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .retry_policy(config.retry)
            .user_agent(concat!("fieldsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, auth, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticated GET returning the decoded envelope.
    ///
    /// Non-2xx statuses are mapped through [`ApiError::from_status`].
    #[instrument(skip(self, query))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiEnvelope<T>, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.auth.access_token().await?;

        let request = self
            .http
            .request(Method::GET, &url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query);

        let response = self.http.send(request).await.map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &url, &body));
        }

        let body = response.bytes().await.map_err(|e| body_read_error(&e, &url))?;
        let envelope: ApiEnvelope<T> = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Payload(format!("failed to decode response from {url}: {e}")))?;

        if envelope.success == Some(false) {
            let message = envelope.message.as_deref().unwrap_or("no message");
            return Err(ApiError::Payload(format!("request to {url} reported failure: {message}")));
        }

        debug!(%url, "GET request successful");
        Ok(envelope)
    }

    /// Probe the API health endpoint.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), ApiError> {
        let url = format!("{}/health", self.base_url);
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .send(self.http.request(Method::GET, &url).bearer_auth(token))
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status.is_success() {
            info!("API health check passed");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &url, &body))
        }
    }
}

/// A body that stops arriving is a transport failure, not a bad payload.
fn body_read_error(err: &reqwest::Error, url: &str) -> ApiError {
    if err.is_timeout() {
        ApiError::Network(format!("timed out reading response from {url}: {err}"))
    } else {
        ApiError::Network(format!("failed to read response from {url}: {err}"))
    }
}

#[async_trait]
impl RemoteSource for ApiClient {
    async fn fetch_page(
        &self,
        entity: EntityType,
        page_number: u32,
        page_size: u32,
    ) -> DomainResult<PageEnvelope> {
        let offset = page_offset(page_number, page_size);
        let query = [("offset", offset.to_string()), ("limit", page_size.to_string())];

        let envelope: ApiEnvelope<PageData> =
            self.get_json(entity.resource_path(), &query).await?;

        let data = envelope.data.ok_or_else(|| {
            ApiError::Payload(format!("{entity} page {page_number} response has no data"))
        })?;

        debug!(
            entity = %entity,
            page = page_number,
            items = data.items.len(),
            total = data.total,
            "fetched page"
        );

        Ok(PageEnvelope {
            success: true,
            items: data.items,
            total: data.total,
            offset: data.offset,
            limit: data.limit.unwrap_or(u64::from(page_size)),
        })
    }

    async fn fetch_customer_documents(&self, customer_id: &str) -> DomainResult<Vec<RawRecord>> {
        let query = [("customerId", customer_id.to_string())];
        match self.get_json::<DocumentsData>(EntityType::KycDocuments.resource_path(), &query).await {
            Ok(envelope) => Ok(envelope.data.map(|data| data.documents).unwrap_or_default()),
            Err(ApiError::NotFound(_)) => {
                debug!(customer_id, "no documents for customer");
                Ok(Vec::new())
            }
            Err(err) => {
                warn!(customer_id, error = %err, "documents request failed");
                Err(err.into())
            }
        }
    }
}
