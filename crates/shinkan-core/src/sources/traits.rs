//! Common types for catalog sources

use thiserror::Error;

use crate::http::HttpError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Http(HttpError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Rate limited by catalog")]
    RateLimit,
}

impl From<HttpError> for SourceError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::RateLimited => SourceError::RateLimit,
            other => SourceError::Http(other),
        }
    }
}
