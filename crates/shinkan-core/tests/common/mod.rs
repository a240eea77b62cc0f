//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde_json::json;
use shinkan_core::{
    CatalogTransport, FetchedBook, HttpError, HttpResponse, KeyValueStorage, MemoryStorage,
    ShinkanConfig, TrackedBook,
};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn memory() -> Arc<dyn KeyValueStorage> {
    Arc::new(MemoryStorage::new())
}

pub fn test_config() -> ShinkanConfig {
    let mut config = ShinkanConfig::default();
    config.catalog.endpoint = "https://catalog.test/search".to_string();
    config.catalog.application_id = "test-app".to_string();
    config
}

pub fn tracked(id: u64, isbn: &str, date: &str) -> TrackedBook {
    TrackedBook::from_fetched(
        id,
        FetchedBook {
            title: format!("book-{}", id),
            author: "author".to_string(),
            release_date: date.to_string(),
            isbn: isbn.to_string(),
            ..Default::default()
        },
    )
}

/// One catalog hit: (title, isbn, salesDate)
pub type Hit<'a> = (&'a str, &'a str, &'a str);

/// A 200 response body with the given hits
pub fn catalog_body(hits: &[Hit<'_>]) -> String {
    let items: Vec<_> = hits
        .iter()
        .map(|(title, isbn, sales_date)| {
            json!({
                "Item": {
                    "title": title,
                    "author": "著者",
                    "largeImageUrl": format!("https://img.test/{}.jpg", isbn),
                    "itemUrl": format!("https://books.test/{}", isbn),
                    "isbn": isbn,
                    "salesDate": sales_date,
                }
            })
        })
        .collect();
    json!({ "count": items.len(), "Items": items }).to_string()
}

pub fn ok(body: String) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse {
        status: 200,
        body,
    })
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub at: tokio::time::Instant,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct FakeState {
    responses: VecDeque<Result<HttpResponse, HttpError>>,
    requests: Vec<RecordedRequest>,
}

/// Catalog transport that replays queued responses and records requests.
///
/// Once the queue is empty every request gets an empty result list.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    state: Arc<Mutex<FakeState>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: Result<HttpResponse, HttpError>) -> &Self {
        self.state.lock().unwrap().responses.push_back(response);
        self
    }

    pub fn respond_hits(&self, hits: &[Hit<'_>]) -> &Self {
        self.respond(ok(catalog_body(hits)))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl CatalogTransport for FakeCatalog {
    async fn get_with_params(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<HttpResponse, HttpError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            url: url.to_string(),
            params: params.to_vec(),
            at: tokio::time::Instant::now(),
        });
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| ok(catalog_body(&[])))
    }
}
