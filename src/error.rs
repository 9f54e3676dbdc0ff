//! Errors that end one source's run (never the whole harvest)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },
    #[error("unexpected page shape: {0}")]
    UnexpectedPageShape(String),
    #[error("invalid CSS selector: {0}")]
    InvalidSelector(String),
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ScrapeError {
    pub fn page_shape(what: impl Into<String>) -> Self {
        ScrapeError::UnexpectedPageShape(what.into())
    }
}
