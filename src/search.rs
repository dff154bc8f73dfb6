//! Keyword search over the text-indexed field
//!
//! Each word of a query is searched on its own. A document scores one point
//! per word it matches, and results are ranked by score.

use crate::client::{Document, DocumentStore};
use crate::config::StoreConfig;
use crate::error::{EtlError, Result};
use crate::etl::Record;
use serde::Serialize;
use std::collections::HashMap;

/// A ranked search result
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub document: Record,
    pub match_score: usize,
}

pub struct SearchTool<S> {
    store: S,
    collection: String,
    field: String,
    limit: usize,
}

impl<S: DocumentStore> SearchTool<S> {
    pub fn new(store: S, config: &StoreConfig, limit: usize) -> Self {
        Self {
            store,
            collection: config.namespace(),
            field: config.search_field.clone(),
            limit,
        }
    }

    /// Search every whitespace-separated word of `query` and rank the union
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let mut per_word = Vec::new();
        for word in query.split_whitespace() {
            let documents = self
                .store
                .find_text(&self.collection, &self.field, word)
                .await
                .map_err(|source| EtlError::Search {
                    word: word.to_string(),
                    source,
                })?;
            log::debug!("'{}' matched {} document(s)", word, documents.len());
            per_word.push(documents);
        }
        Ok(rank(per_word, self.limit))
    }
}

/// Rank documents by how many of the per-word result lists they appear in.
///
/// Ties keep the order in which documents were first seen. The document body
/// kept for each id is the last one returned for it.
pub fn rank(per_word: Vec<Vec<Document>>, limit: usize) -> Vec<SearchHit> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut hits: Vec<SearchHit> = Vec::new();

    for document in per_word.into_iter().flatten() {
        let body = without_hit_keys(document.source);
        match positions.get(&document.id) {
            Some(&position) => {
                let hit = &mut hits[position];
                hit.match_score += 1;
                hit.document = body;
            }
            None => {
                positions.insert(document.id.clone(), hits.len());
                hits.push(SearchHit {
                    id: document.id,
                    document: body,
                    match_score: 1,
                });
            }
        }
    }

    // stable: equal scores stay in first-seen order
    hits.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    hits.truncate(limit);
    hits
}

/// Drop fields that [`SearchHit`] serialises itself, so they are not emitted twice
fn without_hit_keys(mut document: Record) -> Record {
    document.shift_remove("_id");
    document.shift_remove("match_score");
    document
}
