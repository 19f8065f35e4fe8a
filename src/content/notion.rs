use crate::content::{ContentStore, ListQuery, RawPage, StoreError};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// Notion API version the property shapes in `record` are written against.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Upper bound on result pages followed for one query (Notion pages hold up to 100 records).
pub const MAX_QUERY_PAGES: usize = 50;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<RawPage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// Content store backed by Notion databases.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl NotionClient {
    /// Build a client for the API at `base_url` (e.g. "https://api.notion.com/v1").
    ///
    /// The underlying HTTP client is shared by every request, and each request
    /// is bounded by `timeout`.
    pub fn new(token: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid Notion API URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("Notion API URL cannot be used as a base: {}", base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }
}

/// Body for a database query: published records in one locale, newest first.
fn query_body(query: ListQuery, start_cursor: Option<&str>) -> Value {
    let mut body = json!({
        "filter": {
            "and": [
                {
                    "property": "published",
                    "checkbox": { "equals": true }
                },
                {
                    "property": "locale",
                    "select": { "equals": query.locale.code() }
                }
            ]
        },
        "sorts": [
            {
                "property": "date",
                "direction": "descending"
            }
        ]
    });

    if let Some(cursor) = start_cursor {
        body["start_cursor"] = Value::String(cursor.to_string());
    }

    body
}

/// Turn a non-2xx response into `StoreError::Status`, otherwise parse the JSON body.
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl ContentStore for NotionClient {
    async fn query(
        &self,
        collection_id: &str,
        query: ListQuery,
    ) -> Result<Vec<RawPage>, StoreError> {
        let url = self.endpoint(&["databases", collection_id, "query"])?;

        let mut pages = Vec::new();
        let mut next_cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();

        // Fetch all result pages
        for page_number in 1..=MAX_QUERY_PAGES {
            let response = self
                .request(reqwest::Method::POST, url.clone())
                .json(&query_body(query, next_cursor.as_deref()))
                .send()
                .await?;

            let batch: QueryResponse = decode(response).await?;
            debug!(
                "Notion query {}: {} results (has_more: {})",
                collection_id,
                batch.results.len(),
                batch.has_more
            );
            pages.extend(batch.results);

            next_cursor = if batch.has_more { batch.next_cursor } else { None };
            let Some(cursor) = &next_cursor else {
                info!(
                    "Fetched {} {} records from Notion database {}",
                    pages.len(),
                    query.locale,
                    collection_id
                );
                return Ok(pages);
            };

            if !seen_cursors.insert(cursor.clone()) {
                return Err(StoreError::Pagination(format!(
                    "cursor {} repeated after {} pages of {}",
                    cursor, page_number, collection_id
                )));
            }
        }

        Err(StoreError::Pagination(format!(
            "{} still has more results after {} pages",
            collection_id, MAX_QUERY_PAGES
        )))
    }

    async fn retrieve(&self, id: &str) -> Result<Option<RawPage>, StoreError> {
        let url = self.endpoint(&["pages", id])?;

        let response = self.request(reqwest::Method::GET, url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Notion page {} not found", id);
            return Ok(None);
        }

        decode(response).await.map(Some)
    }
}
