//! HTTP client abstraction for the catalog source

mod native;

pub use native::HttpClient;

use std::future::Future;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {message}")]
    RequestFailed { message: String },
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
    #[error("Timeout")]
    Timeout,
    #[error("Rate limited")]
    RateLimited,
    #[error("Unexpected status {0}")]
    Status(u16),
    #[error("Parse error: {message}")]
    ParseError { message: String },
}

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Issues GET requests against the catalog.
///
/// `HttpClient` is the real implementation; tests substitute a recording fake.
pub trait CatalogTransport: Send + Sync {
    fn get_with_params(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}
