//! In-process document store

use super::{Document, DocumentStore};
use crate::error::StoreError;
use crate::etl::Record;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Document>,
    text_indexes: Vec<(String, String)>, // (name, field)
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, Collection>,
    create_index_calls: usize,
    insert_calls: usize,
    batch_sizes: Vec<usize>,
    fail_insert_call: Option<usize>,
    next_id: usize,
}

/// Document store held entirely in memory.
///
/// Clones share the same state, so a clone handed to the pipeline can be
/// inspected afterwards. Document ids are sequential integers starting at 1.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `call`-th insert (1-based) fail with a backend error
    pub fn fail_on_insert(self, call: usize) -> Self {
        self.lock().fail_insert_call = Some(call);
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of `create_text_index` calls received so far
    pub fn create_index_calls(&self) -> usize {
        self.lock().create_index_calls
    }

    /// Sizes of every successful bulk insert, in call order
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.lock().batch_sizes.clone()
    }

    /// All documents stored in `collection`, in insertion order
    pub fn documents(&self, collection: &str) -> Vec<Record> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.documents.iter().map(|d| d.source.clone()).collect())
            .unwrap_or_default()
    }
}

fn contains_word(value: Option<&Value>, phrase: &str) -> bool {
    let Some(text) = value.and_then(Value::as_str) else {
        return false;
    };
    let words: Vec<String> = tokens(text).collect();
    let wanted: Vec<String> = tokens(phrase).collect();
    !wanted.is_empty() && words.windows(wanted.len()).any(|w| w == wanted.as_slice())
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

impl DocumentStore for MemoryStore {
    async fn index_information(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lock()
            .collections
            .get(collection)
            .map(|c| c.text_indexes.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default())
    }

    async fn create_text_index(
        &self,
        collection: &str,
        field: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.create_index_calls += 1;
        let collection = state.collections.entry(collection.to_string()).or_default();
        if collection.text_indexes.iter().any(|(n, _)| n == name) {
            return Err(StoreError::Backend(format!("index {} already exists", name)));
        }
        collection
            .text_indexes
            .push((name.to_string(), field.to_string()));
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: &[Record]) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.insert_calls += 1;
        if state.fail_insert_call == Some(state.insert_calls) {
            return Err(StoreError::Backend(format!(
                "insert #{} refused",
                state.insert_calls
            )));
        }

        let first_id = state.next_id + 1;
        state.next_id += documents.len();
        state.batch_sizes.push(documents.len());
        let stored = state.collections.entry(collection.to_string()).or_default();
        stored
            .documents
            .extend(documents.iter().enumerate().map(|(offset, source)| Document {
                id: (first_id + offset).to_string(),
                source: source.clone(),
            }));
        Ok(())
    }

    async fn find_text(
        &self,
        collection: &str,
        field: &str,
        phrase: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let state = self.lock();
        let Some(stored) = state.collections.get(collection) else {
            return Ok(Vec::new());
        };
        if !stored.text_indexes.iter().any(|(_, f)| f == field) {
            return Err(StoreError::Backend(format!(
                "no text index on {}.{}",
                collection, field
            )));
        }
        Ok(stored
            .documents
            .iter()
            .filter(|d| contains_word(d.source.get(field), phrase))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(description: &str) -> Record {
        let mut record = Record::new();
        record.insert("source_description".into(), json!(description));
        record
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new();
        store
            .create_text_index("db.docs", "source_description", "source_description_text")
            .await
            .unwrap();
        store
            .insert_many("db.docs", &[record("Alpha round"), record("beta, alpha"), record("gamma")])
            .await
            .unwrap();

        let found = store
            .find_text("db.docs", "source_description", "alpha")
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(store.batch_sizes(), vec![3]);
    }

    #[tokio::test]
    async fn test_duplicate_index_rejected() {
        let store = MemoryStore::new();
        store.create_text_index("c", "f", "f_text").await.unwrap();
        assert!(store.create_text_index("c", "f", "f_text").await.is_err());
        assert_eq!(store.create_index_calls(), 2);
    }

    #[tokio::test]
    async fn test_fail_on_insert() {
        let store = MemoryStore::new().fail_on_insert(2);
        store.insert_many("c", &[record("a")]).await.unwrap();
        assert!(store.insert_many("c", &[record("b")]).await.is_err());
        store.insert_many("c", &[record("c")]).await.unwrap();
        assert_eq!(store.batch_sizes(), vec![1, 1]);
        assert_eq!(store.documents("c").len(), 2);
    }
}
