//! SOCKS5 proxy address value

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::{Host, Url};

const SCHEME: &str = "socks5";

/// Reasons a scraped `(host, port)` pair is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("empty host")]
    EmptyHost,
    #[error("port {0} out of range 1-65535")]
    PortOutOfRange(String),
    #[error("port {0:?} is not a number")]
    PortNotNumeric(String),
    #[error("invalid socks5 proxy: {0}")]
    InvalidAuthority(String),
    #[error("not a socks5 uri: {0}")]
    NotSocks5Uri(String),
}

/// A validated `socks5://host:port` endpoint.
///
/// Equality, ordering and hashing are over `(host, port)`, which is what
/// deduplication in the aggregator relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyAddr {
    host: String,
    port: u16,
}

impl ProxyAddr {
    /// Validate `host` and `port` as a network authority.
    ///
    /// The host must parse as a domain, IPv4 address or bracketed IPv6
    /// literal, and `socks5://host:port` must round-trip through a URL parser
    /// to the same host and port.
    pub fn new(host: &str, port: u64) -> Result<Self, AddressError> {
        if host.is_empty() {
            return Err(AddressError::EmptyHost);
        }
        let port = match u16::try_from(port) {
            Ok(p) if p != 0 => p,
            _ => return Err(AddressError::PortOutOfRange(port.to_string())),
        };

        let authority = format!("{}:{}", host, port);
        if Host::parse(host).is_err() {
            return Err(AddressError::InvalidAuthority(authority));
        }

        let url = Url::parse(&format!("{}://{}", SCHEME, authority))
            .map_err(|_| AddressError::InvalidAuthority(authority.clone()))?;
        if url.host_str() != Some(host) || url.port() != Some(port) {
            return Err(AddressError::InvalidAuthority(authority));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Same as [`ProxyAddr::new`] with the port given as scraped text
    pub fn from_text(host: &str, port: &str) -> Result<Self, AddressError> {
        let port = port.trim();
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressError::PortNotNumeric(port.to_string()));
        }
        // Digits only, so the only parse failure left is overflow
        let number = port
            .parse::<u64>()
            .map_err(|_| AddressError::PortOutOfRange(port.to_string()))?;
        Self::new(host.trim(), number)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn to_uri(&self) -> String {
        format!("{}://{}:{}", SCHEME, self.host, self.port)
    }
}

impl fmt::Display for ProxyAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for ProxyAddr {
    type Err = AddressError;

    /// Inverse of [`ProxyAddr::to_uri`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let not_socks5 = || AddressError::NotSocks5Uri(s.to_string());
        let url = Url::parse(s).map_err(|_| not_socks5())?;

        let bare = url.username().is_empty()
            && url.password().is_none()
            && matches!(url.path(), "" | "/")
            && url.query().is_none()
            && url.fragment().is_none();
        if url.scheme() != SCHEME || !bare {
            return Err(not_socks5());
        }

        match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => Self::new(host, u64::from(port)),
            _ => Err(not_socks5()),
        }
    }
}
