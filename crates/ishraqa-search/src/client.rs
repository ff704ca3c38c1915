use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::SearchFailure;
use crate::request::SearchRequest;
use crate::types::ResultPage;

const API_KEY_HEADER: &str = "x-api-key";

/// Search backend abstraction - the renderer only ever talks to this.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run one search.
    ///
    /// Backend failures never surface as `Err`: they produce an empty page
    /// echoing the query. `Err` means the request itself is invalid.
    async fn search(&self, request: &SearchRequest) -> Result<ResultPage>;

    /// Backend name for logging/tracking
    fn backend_name(&self) -> &str;
}

/// HTTP implementation against the storefront search API
pub struct HttpSearchClient {
    client: Client,
    config: ClientConfig,
}

impl HttpSearchClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a search and report backend failures instead of collapsing them.
    pub async fn try_search(
        &self,
        request: &SearchRequest,
    ) -> Result<std::result::Result<ResultPage, SearchFailure>> {
        request.validate()?;
        let url = request.to_url(&self.config.base_url)?;
        debug!(url = %url, "Search request");
        Ok(self.fetch(url, request).await)
    }

    async fn fetch(
        &self,
        url: reqwest::Url,
        request: &SearchRequest,
    ) -> std::result::Result<ResultPage, SearchFailure> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchFailure::Status { status, body });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Raw search response received");

        let envelope = Envelope::from_slice(&body)?;
        Ok(envelope.into_page(request))
    }
}

#[async_trait]
impl SearchClient for HttpSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<ResultPage> {
        match self.try_search(request).await? {
            Ok(page) => Ok(page),
            Err(failure) => {
                match &failure {
                    SearchFailure::Status { status, body } => {
                        error!(status = %status, body = %body, "Search backend error");
                    }
                    other => {
                        warn!(kind = other.kind(), error = %other, "Search failed");
                    }
                }
                Ok(ResultPage::empty(
                    &request.query,
                    request.index_name(),
                    request.page,
                    request.hits_per_page,
                ))
            }
        }
    }

    fn backend_name(&self) -> &str {
        &self.config.base_url
    }
}
