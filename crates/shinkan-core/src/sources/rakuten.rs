//! Rakuten Books catalog source
//!
//! API docs: https://webservice.rakuten.co.jp/documentation/books-book-search
//! Rate limit: 1 request per second per application id

use serde::Deserialize;

use super::traits::SourceError;
use crate::config::CatalogConfig;
use crate::dates::normalize_date;
use crate::domain::{BookSize, FetchedBook, KeywordFilter};
use crate::http::{CatalogTransport, HttpClient};

/// Search response wrapper
#[derive(Debug, Deserialize)]
struct RakutenResponse {
    #[serde(rename = "Items")]
    items: Vec<RakutenItemWrapper>,
}

#[derive(Debug, Deserialize)]
struct RakutenItemWrapper {
    #[serde(rename = "Item")]
    item: RakutenItem,
}

/// The fields of one search hit that are kept
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RakutenItem {
    title: String,
    author: String,
    large_image_url: String,
    item_url: String,
    isbn: String,
    sales_date: String,
}

/// Error body returned with 4xx responses
#[derive(Debug, Deserialize)]
struct RakutenErrorBody {
    error: String,
    #[serde(default)]
    error_description: String,
}

pub struct RakutenBooksSource<T = HttpClient> {
    client: T,
    endpoint: String,
    application_id: String,
    hits: u32,
}

impl<T: CatalogTransport> RakutenBooksSource<T> {
    pub fn new(client: T, config: &CatalogConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            application_id: config.application_id.clone(),
            hits: config.hits,
        }
    }

    /// Run one keyword filter against the catalog.
    ///
    /// Returns every hit, normalized; recency filtering is the caller's job.
    pub async fn search(&self, filter: &KeywordFilter) -> Result<Vec<FetchedBook>, SourceError> {
        let params = build_query_params(filter, &self.application_id, self.hits);
        let response = self.client.get_with_params(&self.endpoint, &params).await?;

        if response.status != 200 {
            if let Ok(body) = serde_json::from_str::<RakutenErrorBody>(&response.body) {
                return Err(SourceError::Parse(format!(
                    "Status {}: {} {}",
                    response.status, body.error, body.error_description
                )));
            }
            return Err(SourceError::Http(crate::http::HttpError::Status(
                response.status,
            )));
        }

        parse_search_response(&response.body, Some(filter.size))
    }
}

/// Query parameters for one keyword filter.
///
/// Fixed: JSON, newest release first, include out-of-stock (pre-order) items,
/// `hits` results. Title and author are sent only when non-blank.
pub fn build_query_params(
    filter: &KeywordFilter,
    application_id: &str,
    hits: u32,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("format".to_string(), "json".to_string()),
        ("sort".to_string(), "-releaseDate".to_string()),
        ("applicationId".to_string(), application_id.to_string()),
        ("outOfStockFlag".to_string(), "1".to_string()),
        ("hits".to_string(), hits.to_string()),
        ("size".to_string(), filter.size.code().to_string()),
    ];

    if let Some(title) = filter.title_term() {
        params.push(("title".to_string(), title.to_string()));
    }
    if let Some(author) = filter.author_term() {
        params.push(("author".to_string(), author.to_string()));
    }

    params
}

/// Parse a search response body into fetched books.
pub fn parse_search_response(
    json: &str,
    size: Option<BookSize>,
) -> Result<Vec<FetchedBook>, SourceError> {
    let response: RakutenResponse = serde_json::from_str(json)
        .map_err(|e| SourceError::Parse(format!("Invalid Rakuten JSON: {}", e)))?;

    Ok(response
        .items
        .into_iter()
        .map(|wrapper| to_fetched_book(wrapper.item, size))
        .collect())
}

fn to_fetched_book(item: RakutenItem, size: Option<BookSize>) -> FetchedBook {
    let release_date = normalize_date(&item.sales_date);
    FetchedBook {
        title: item.title,
        author: item.author,
        sales_date: item.sales_date,
        release_date,
        cover_image_url: item.large_image_url,
        detail_url: item.item_url,
        isbn: item.isbn,
        size,
    }
}
