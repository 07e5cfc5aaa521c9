//! HTTP client for the avatar generator.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::upstream::query::build_upstream_url;

/// MIME type requested from the generator and used for SVG fallbacks.
pub const SVG_MIME: &str = "image/svg+xml";

/// Errors that can occur while talking to the avatar generator.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The generator answered with a non-2xx status.
    #[error("upstream returned {0}")]
    Status(StatusCode),

    /// Connection, protocol or body decoding failure.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured base URL could not be parsed.
    #[error("invalid upstream base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Pooled client bound to one generator base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, base_url })
    }

    /// URL the given inbound query pairs are forwarded to.
    pub fn url_for(&self, pairs: &[(String, String)]) -> Url {
        build_upstream_url(&self.base_url, pairs)
    }

    /// GET `url` asking for SVG and return the body as text.
    ///
    /// Only the status is checked; content type and body are taken as-is.
    pub async fn fetch_svg(&self, url: Url) -> Result<String, UpstreamError> {
        let response = self.client.get(url).header(ACCEPT, SVG_MIME).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        Ok(response.text().await?)
    }
}
