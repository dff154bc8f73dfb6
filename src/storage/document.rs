//! Document collection storage with text index bootstrap

use super::Storage;
use crate::client::DocumentStore;
use crate::config::StoreConfig;
use crate::error::{EtlError, Result};
use crate::etl::Record;

/// Persists record batches into one collection of a [`DocumentStore`].
///
/// Connecting makes sure the configured search field carries a text index
/// named `<field>_text`. Existing index metadata is checked first, so
/// connecting again is cheap and never creates a duplicate.
pub struct DocumentStorage<S> {
    store: S,
    collection: String,
    index_name: String,
}

impl<S: DocumentStore> DocumentStorage<S> {
    /// Bind to the configured collection and bootstrap its text index
    ///
    /// # Errors
    /// `IndexBootstrap` if the index metadata cannot be read or the index cannot be created
    pub async fn connect(store: S, config: &StoreConfig) -> Result<Self> {
        let storage = Self {
            store,
            collection: config.namespace(),
            index_name: config.index_name(),
        };
        storage.ensure_text_index(&config.search_field).await?;
        Ok(storage)
    }

    async fn ensure_text_index(&self, field: &str) -> Result<()> {
        let bootstrap_error = |source| EtlError::IndexBootstrap {
            index: self.index_name.clone(),
            source,
        };

        let existing = self
            .store
            .index_information(&self.collection)
            .await
            .map_err(bootstrap_error)?;
        if existing.iter().any(|name| name == &self.index_name) {
            log::debug!(
                "Text index '{}' already exists on '{}'",
                self.index_name,
                self.collection
            );
            return Ok(());
        }

        self.store
            .create_text_index(&self.collection, field, &self.index_name)
            .await
            .map_err(bootstrap_error)?;
        log::info!(
            "Created text index '{}' on '{}'",
            self.index_name,
            self.collection
        );
        Ok(())
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl<S: DocumentStore> Storage for DocumentStorage<S> {
    async fn save(&self, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.store
            .insert_many(&self.collection, records)
            .await
            .map_err(|source| EtlError::StorageWrite {
                collection: self.collection.clone(),
                source,
            })
    }
}

impl<S> std::fmt::Display for DocumentStorage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Document, MemoryStore};
    use crate::error::StoreError;
    use serde_json::json;

    /// Store whose index metadata query always fails
    struct UnreachableStore;

    impl DocumentStore for UnreachableStore {
        async fn index_information(&self, _: &str) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
        async fn create_text_index(&self, _: &str, _: &str, _: &str) -> Result<(), StoreError> {
            unreachable!("index creation after failed metadata query")
        }
        async fn insert_many(&self, _: &str, _: &[Record]) -> Result<(), StoreError> {
            unreachable!()
        }
        async fn find_text(&self, _: &str, _: &str, _: &str) -> Result<Vec<Document>, StoreError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_index_bootstrap_is_idempotent() {
        let store = MemoryStore::new();
        let config = StoreConfig::default();

        DocumentStorage::connect(store.clone(), &config).await.unwrap();
        DocumentStorage::connect(store.clone(), &config).await.unwrap();

        assert_eq!(store.create_index_calls(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_failure() {
        let result = DocumentStorage::connect(UnreachableStore, &StoreConfig::default()).await;
        match result {
            Err(EtlError::IndexBootstrap { index, .. }) => {
                assert_eq!(index, "source_description_text")
            }
            _ => panic!("expected an index bootstrap error"),
        }
    }

    #[tokio::test]
    async fn test_save_inserts_one_batch() {
        let store = MemoryStore::new();
        let config = StoreConfig::default();
        let storage = DocumentStorage::connect(store.clone(), &config).await.unwrap();

        let mut record = Record::new();
        record.insert("source_description".into(), json!("seed round"));
        storage.save(&[record.clone(), record]).await.unwrap();
        storage.save(&[]).await.unwrap();

        assert_eq!(store.batch_sizes(), vec![2]);
        assert_eq!(store.documents(storage.collection()).len(), 2);
    }

    #[tokio::test]
    async fn test_save_failure_is_storage_write_error() {
        let store = MemoryStore::new().fail_on_insert(1);
        let storage = DocumentStorage::connect(store, &StoreConfig::default())
            .await
            .unwrap();

        let result = storage.save(&[Record::new()]).await;
        assert!(matches!(result, Err(EtlError::StorageWrite { .. })));
    }
}
