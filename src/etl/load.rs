//! Loader trait and the chunked loader that feeds a [`Storage`]

use super::Record;
use crate::error::Result;
use crate::storage::Storage;
use std::future::Future;
use std::num::NonZeroUsize;

/// Loader trait for loading data to a destination
///
/// # Example
/// ```no_run
/// use csv_doc_etl::etl::Loader;
/// use csv_doc_etl::Result;
///
/// struct CountingLoader;
///
/// impl Loader for CountingLoader {
///     type Item = String;
///
///     async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
///         Ok(items.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The type of items to load
    type Item: Send;

    /// Load items to the destination
    ///
    /// Returns the number of items successfully loaded
    fn load(&self, items: Vec<Self::Item>) -> impl Future<Output = Result<usize>> + Send;
}

/// Splits records into fixed-size chunks and saves them one at a time.
///
/// Every chunk holds `chunk_size` records except possibly the last, which
/// holds the remainder. A failed save stops the load; later chunks are never
/// sent.
pub struct ChunkedLoader<S> {
    storage: S,
    chunk_size: NonZeroUsize,
}

impl<S: Storage> ChunkedLoader<S> {
    pub fn new(storage: S, chunk_size: NonZeroUsize) -> Self {
        Self {
            storage,
            chunk_size,
        }
    }
}

impl<S: Storage> Loader for ChunkedLoader<S> {
    type Item = Record;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        let total = items.len();
        let chunk_count = total.div_ceil(self.chunk_size.get());

        for (index, chunk) in items.chunks(self.chunk_size.get()).enumerate() {
            self.storage.save(chunk).await?;
            log::info!(
                "Saved chunk {}/{} ({} record(s))",
                index + 1,
                chunk_count,
                chunk.len()
            );
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EtlError, StoreError};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Records every batch it is asked to save; fails on the `fail_on`-th call
    #[derive(Clone, Default)]
    struct RecordingStorage {
        batches: Arc<Mutex<Vec<Vec<Record>>>>,
        calls: Arc<Mutex<usize>>,
        fail_on: Option<usize>,
    }

    impl Storage for RecordingStorage {
        async fn save(&self, records: &[Record]) -> Result<()> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if self.fail_on == Some(call) {
                return Err(EtlError::StorageWrite {
                    collection: "test".into(),
                    source: StoreError::Backend("boom".into()),
                });
            }
            self.batches.lock().unwrap().push(records.to_vec());
            Ok(())
        }
    }

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let mut record = Record::new();
                record.insert("row".into(), json!(i));
                record
            })
            .collect()
    }

    fn loader(storage: &RecordingStorage, chunk_size: usize) -> ChunkedLoader<RecordingStorage> {
        ChunkedLoader::new(storage.clone(), NonZeroUsize::new(chunk_size).unwrap())
    }

    #[tokio::test]
    async fn test_chunks_preserve_order_and_sizes() {
        for (len, chunk_size) in [(10, 3), (9, 3), (1, 5), (100, 1), (7, 7)] {
            let storage = RecordingStorage::default();
            let input = records(len);
            let count = loader(&storage, chunk_size).load(input.clone()).await.unwrap();
            assert_eq!(count, len);

            let batches = storage.batches.lock().unwrap();
            let (last, full) = batches.split_last().unwrap();
            assert!(full.iter().all(|b| b.len() == chunk_size));
            let expected_last = match len % chunk_size {
                0 => chunk_size,
                remainder => remainder,
            };
            assert_eq!(last.len(), expected_last);
            assert_eq!(batches.concat(), input);
        }
    }

    #[tokio::test]
    async fn test_empty_load_saves_nothing() {
        let storage = RecordingStorage::default();
        let count = loader(&storage, 2).load(Vec::new()).await.unwrap();
        assert_eq!(count, 0);
        assert_eq!(*storage.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_three_records_in_chunks_of_two() {
        let storage = RecordingStorage::default();
        loader(&storage, 2).load(records(3)).await.unwrap();
        let sizes: Vec<usize> = storage.batches.lock().unwrap().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_failure_halts_remaining_chunks() {
        let storage = RecordingStorage {
            fail_on: Some(2),
            ..Default::default()
        };
        let input = records(3);
        let result = loader(&storage, 2).load(input.clone()).await;

        assert!(matches!(result, Err(EtlError::StorageWrite { .. })));
        assert_eq!(*storage.calls.lock().unwrap(), 2);
        let batches = storage.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], input[..2].to_vec());
    }
}
