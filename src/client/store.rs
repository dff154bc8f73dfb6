//! HTTP document store client
//!
//! Talks to an Elasticsearch-compatible REST API. A collection maps to an
//! index, a text index maps to a `text` field mapping, and bulk inserts go
//! through `/_bulk`.

use super::{Auth, Document, DocumentStore};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::etl::Record;
use base64::Engine;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use url::Url;

/// Upper bound on hits fetched per phrase search
const MAX_SEARCH_HITS: usize = 10_000;

/// Client for an Elasticsearch-compatible document store.
///
/// # Example
/// ```no_run
/// use csv_doc_etl::client::{Auth, DocumentStore, StoreClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = Url::parse("http://localhost:9200")?;
/// let client = StoreClient::try_new(url, Auth::None)?;
/// let indexes = client.index_information("startup.investment").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct StoreClient {
    client: Client,
    url: Url,
}

impl StoreClient {
    /// Create a client for the store at `url` using `auth` on every request
    pub fn try_new(url: Url, auth: Auth) -> Result<Self, StoreError> {
        let mut headers = reqwest::header::HeaderMap::new();
        match auth {
            Auth::Basic(username, password) => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                headers.append(
                    reqwest::header::AUTHORIZATION,
                    format!("Basic {}", credentials).parse()?,
                );
            }
            Auth::Apikey(apikey) => {
                headers.append(
                    reqwest::header::AUTHORIZATION,
                    format!("ApiKey {}", apikey).parse()?,
                );
            }
            Auth::None => {}
        }
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, url })
    }

    /// Create a client from store configuration
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config.url()?;
        log::debug!("Connecting to document store at {} ({} auth)", url, config.auth());
        Self::try_new(url, config.auth())
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, StoreError> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let url = self.url.join(path)?;
        log::trace!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }

    /// Fail on any non-success status, keeping the response body for the error
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status { status, body })
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool, StoreError> {
        let response = self.request(Method::HEAD, collection)?.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => Self::check(response).await.map(|_| true),
        }
    }
}

impl DocumentStore for StoreClient {
    async fn index_information(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let response = self
            .request(Method::GET, &format!("{}/_mapping", collection))?
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            log::debug!("Collection '{}' does not exist yet", collection);
            return Ok(Vec::new());
        }
        let mappings: Value = Self::check(response).await?.json().await?;
        Ok(text_index_names(&mappings))
    }

    async fn create_text_index(
        &self,
        collection: &str,
        field: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let properties = json!({ field: { "type": "text" } });
        let request = if self.collection_exists(collection).await? {
            self.request(Method::PUT, &format!("{}/_mapping", collection))?
                .json(&json!({ "properties": properties }))
        } else {
            self.request(Method::PUT, collection)?
                .json(&json!({ "mappings": { "properties": properties } }))
        };

        log::debug!("Creating text index '{}' on {}.{}", name, collection, field);
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: &[Record]) -> Result<(), StoreError> {
        let action = serde_json::to_string(&json!({ "index": { "_index": collection } }))?;
        let mut body = String::new();
        for document in documents {
            body.push_str(&action);
            body.push('\n');
            body.push_str(&serde_json::to_string(document)?);
            body.push('\n');
        }

        log::debug!(
            "Bulk inserting {} document(s) into '{}'",
            documents.len(),
            collection
        );
        let response = self
            .request(Method::POST, "_bulk")?
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        let summary: Value = Self::check(response).await?.json().await?;
        bulk_outcome(&summary, documents.len())
    }

    async fn find_text(
        &self,
        collection: &str,
        field: &str,
        phrase: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let response = self
            .request(Method::POST, &format!("{}/_search", collection))?
            .query(&[("size", MAX_SEARCH_HITS)])
            .json(&json!({ "query": { "match_phrase": { field: phrase } } }))
            .send()
            .await?;
        let found: Value = Self::check(response).await?.json().await?;
        parse_hits(&found)
    }
}

impl std::fmt::Display for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// `<field>_text` for every top-level field mapped as `text`
fn text_index_names(mappings: &Value) -> Vec<String> {
    let mut names = Vec::new();
    let Some(indexes) = mappings.as_object() else {
        return names;
    };
    for index in indexes.values() {
        let Some(properties) = index
            .pointer("/mappings/properties")
            .and_then(Value::as_object)
        else {
            continue;
        };
        for (field, mapping) in properties {
            let name = format!("{}_text", field);
            if mapping.get("type").and_then(Value::as_str) == Some("text") && !names.contains(&name)
            {
                names.push(name);
            }
        }
    }
    names
}

/// The bulk API answers 200 even when items fail; inspect the per-item results.
fn bulk_outcome(summary: &Value, total: usize) -> Result<(), StoreError> {
    if !summary.get("errors").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(());
    }
    let failures: Vec<&Value> = summary
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("index").and_then(|i| i.get("error")))
                .collect()
        })
        .unwrap_or_default();
    let reason = failures
        .first()
        .and_then(|e| e.get("reason").and_then(Value::as_str))
        .unwrap_or("unknown bulk error")
        .to_string();
    Err(StoreError::Rejected {
        failed: failures.len(),
        total,
        reason,
    })
}

fn parse_hits(found: &Value) -> Result<Vec<Document>, StoreError> {
    let hits = found
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::Response("search response has no hits array".into()))?;

    hits.iter()
        .map(|hit| {
            let id = hit
                .get("_id")
                .and_then(Value::as_str)
                .ok_or_else(|| StoreError::Response("search hit without _id".into()))?;
            let source = hit
                .get("_source")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            Ok(Document {
                id: id.to_string(),
                source,
            })
        })
        .collect()
}
