//! Runtime configuration
//!
//! Every field has a default, so running with no config file and no flags
//! performs the standard full harvest into `proxies.txt`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::sources::Source;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File the harvested URIs are written to, overwritten each run
    pub output: PathBuf,
    /// Per-request timeout
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Sources scraped at the same time
    pub concurrency: usize,
    pub sources: Vec<Source>,
    /// URL requested through each proxy by `check`
    pub check_url: String,
    pub check_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from("proxies.txt"),
            timeout_secs: 20,
            user_agent: concat!("proxy_harvest/", env!("CARGO_PKG_VERSION")).to_string(),
            concurrency: 4,
            sources: Source::ALL.to_vec(),
            check_url: "https://ifconfig.me".to_string(),
            check_workers: 16,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_json(r#"{"timeout_secs": 5, "sources": ["spys-one"]}"#).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.sources, vec![Source::SpysOne]);
        assert_eq!(config.output, PathBuf::from("proxies.txt"));
        assert_eq!(config.check_workers, 16);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        assert!(Config::from_json(r#"{"sources": ["nope"]}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/proxy_harvest.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
