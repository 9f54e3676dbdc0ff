//! SOCKS5 proxy list harvester
//!
//! Scrapes public proxy list pages and collects `socks5://host:port` URIs:
//! - socks-proxy.net (plain table)
//! - spys.one (ports obfuscated behind page script, see [`script`])
//! - proxyserverlist24 (index page plus one fetch per post)
//! - proxynova (host inside `<abbr title>`)
//!
//! Results are deduplicated and written to a flat file by [`aggregate`].

pub mod aggregate;
pub mod check;
pub mod config;
pub mod error;
pub mod fetch;
pub mod html;
pub mod proxy;
pub mod script;
pub mod sources;

pub use config::Config;
pub use error::ScrapeError;
pub use fetch::{Fetch, HttpFetcher};
pub use proxy::{AddressError, ProxyAddr};
pub use sources::Source;
