//! Map provider HTTP client.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};

use crate::domain::LineDescriptor;

use super::error::SourceError;
use super::provider::parse_provider_lines;

/// Default subway document (Xi'an).
pub const DEFAULT_DATA_URL: &str = "https://map.amap.com/service/subway?srhdata=6101_drw_xian.json";

/// The provider rejects requests without a browser-like user agent.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Configuration for the provider client.
#[derive(Debug, Clone)]
pub struct SourceClientConfig {
    /// URL of the city's subway document
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl SourceClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for SourceClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_URL)
    }
}

/// Client for the map provider's subway documents.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: reqwest::Client,
    url: String,
}

impl SourceClient {
    pub fn new(config: SourceClientConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent).map_err(|_| SourceError::Api {
            status: 0,
            message: "invalid user agent".to_string(),
        })?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw subway document.
    pub async fn fetch_raw(&self) -> Result<String, SourceError> {
        debug!(url = %self.url, "fetching subway document");
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }

    /// Fetch and parse the subway document.
    pub async fn fetch_lines(&self) -> Result<Vec<LineDescriptor>, SourceError> {
        let body = self.fetch_raw().await?;
        let lines = parse_provider_lines(&body)?;
        info!(url = %self.url, lines = lines.len(), "fetched network data");
        Ok(lines)
    }
}
