//! Proxy list sources
//!
//! Each module knows one site's markup and turns its page(s) into
//! [`ProxyAddr`] values. The markup assumptions are scraping heuristics and
//! are expected to drift; a layout change degrades to fewer results rather
//! than aborting the harvest.

pub mod proxynova;
pub mod proxyserverlist24;
pub mod socks_proxy_net;
pub mod spys_one;

use scraper::Html;
use serde::Deserialize;

use crate::error::ScrapeError;
use crate::fetch::Fetch;
use crate::proxy::ProxyAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    SocksProxyNet,
    SpysOne,
    #[serde(rename = "proxyserverlist24")]
    #[value(name = "proxyserverlist24")]
    ProxyServerList24,
    #[serde(rename = "proxynova")]
    #[value(name = "proxynova")]
    ProxyNova,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::SocksProxyNet,
        Source::SpysOne,
        Source::ProxyServerList24,
        Source::ProxyNova,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Source::SocksProxyNet => "socks-proxy.net",
            Source::SpysOne => "spys.one",
            Source::ProxyServerList24 => "proxyserverlist24.top",
            Source::ProxyNova => "proxynova.com",
        }
    }

    pub fn url(self) -> &'static str {
        match self {
            Source::SocksProxyNet => socks_proxy_net::URL,
            Source::SpysOne => spys_one::URL,
            Source::ProxyServerList24 => proxyserverlist24::URL,
            Source::ProxyNova => proxynova::URL,
        }
    }

    /// Fetch this source's page(s) and extract every proxy on them
    pub async fn collect<F: Fetch>(self, fetcher: &F) -> Result<Vec<ProxyAddr>, ScrapeError> {
        match self {
            Source::SocksProxyNet => single_page(fetcher, self.url(), socks_proxy_net::extract).await,
            Source::SpysOne => single_page(fetcher, self.url(), spys_one::extract).await,
            Source::ProxyServerList24 => proxyserverlist24::collect(fetcher, self.url()).await,
            Source::ProxyNova => single_page(fetcher, self.url(), proxynova::extract).await,
        }
    }
}

type Extract = fn(&Html) -> Result<Vec<ProxyAddr>, ScrapeError>;

async fn single_page<F: Fetch>(
    fetcher: &F,
    url: &str,
    extract: Extract,
) -> Result<Vec<ProxyAddr>, ScrapeError> {
    let body = fetcher.fetch(url).await?;
    extract(&Html::parse_document(&body))
}
