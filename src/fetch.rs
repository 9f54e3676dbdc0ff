//! Page fetching

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::Config;
use crate::error::ScrapeError;

/// Anything that can turn a URL into a response body.
///
/// Sources only ever see this trait, so tests can serve canned pages.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, ScrapeError>>;
}

/// reqwest-backed fetcher with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp.text().await?)
    }
}

/// Serves fixed bodies by exact URL; anything else is a 404
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct StaticPages {
    pages: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl StaticPages {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[cfg(test)]
impl Fetch for StaticPages {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}
