//! `XmltvClient` - HTTP schedule source.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::api::GuideSource;
use super::error::GuideError;

/// Default schedule URL (the streaming server's guide endpoint).
pub const DEFAULT_GUIDE_URL: &str = "http://localhost:8409/guide/xmltv.xml";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// XMLTV document client.
///
/// Issues a single GET per fetch; there is no retry. The next scheduler
/// tick is the retry.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct XmltvClient {
    /// HTTP client (reqwest, gzip enabled).
    http_client: Client,
    /// Document URL.
    url: Url,
}

/// Builder for `XmltvClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct XmltvClientBuilder {
    url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl XmltvClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            url: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// Sets the document URL (default: [`DEFAULT_GUIDE_URL`]).
    #[must_use]
    pub fn url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the request timeout (default: 30s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<XmltvClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let url = if let Some(url) = self.url {
            url
        } else {
            let result = Url::parse(DEFAULT_GUIDE_URL);
            result.context("invalid default guide URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .context("failed to build HTTP client")?;

        Ok(XmltvClient { http_client, url })
    }
}

impl XmltvClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> XmltvClientBuilder {
        XmltvClientBuilder::new()
    }

    /// Returns the document URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

impl GuideSource for XmltvClient {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn fetch_document(&self) -> Result<String, GuideError> {
        let response = self
            .http_client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| GuideError::FetchFailure(format!("request failed: {e}")))?;

        let status = response.status();
        tracing::trace!(%status, headers = ?response.headers(), "Response headers");
        if !status.is_success() {
            return Err(GuideError::FetchFailure(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GuideError::FetchFailure(format!("failed to read response body: {e}")))?;
        tracing::debug!(body_len = body.len(), "Schedule document received");
        Ok(body)
    }
}
