//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use crate::error::Result;

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// Each extracted item is transformed into a batch and loaded before the
/// next item is pulled from the extractor.
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (turns one `E::Item` into a batch of `L::Item`)
/// - `L`: Loader type
///
/// # Example
/// ```no_run
/// use csv_doc_etl::client::MemoryStore;
/// use csv_doc_etl::config::StoreConfig;
/// use csv_doc_etl::etl::{ChunkedLoader, Pipeline, RowRecordTransformer, Source, SourceExtractor};
/// use csv_doc_etl::storage::{CsvFileSource, DocumentStorage};
/// use std::num::NonZeroUsize;
///
/// # async fn example() -> csv_doc_etl::Result<()> {
/// let storage = DocumentStorage::connect(MemoryStore::new(), &StoreConfig::default()).await?;
/// let pipeline = Pipeline::new(
///     SourceExtractor::new(vec![Source::from(CsvFileSource::new("rounds.csv"))]),
///     RowRecordTransformer::new(),
///     ChunkedLoader::new(storage, NonZeroUsize::new(1000).unwrap()),
/// );
///
/// let count = pipeline.run().await?;
/// println!("Loaded {} records", count);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item, Output = Vec<L::Item>>,
    L: Loader,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Run the complete ETL pipeline
    ///
    /// Returns the number of items loaded across all extracted inputs
    ///
    /// # Errors
    /// Returns the first error from any stage; nothing after it is processed
    pub async fn run(&self) -> Result<usize> {
        log::info!("Starting ETL pipeline");
        let mut total = 0;

        for (index, extracted) in self.extractor.extract().enumerate() {
            let item = extracted?;
            log::info!("Extracted input #{}", index + 1);

            let batch = self.transformer.transform(item)?;
            log::info!("Transformed {} record(s)", batch.len());

            if batch.is_empty() {
                log::warn!("Input #{} produced no records, nothing to load", index + 1);
                continue;
            }

            let count = self.loader.load(batch).await?;
            log::info!("Loaded {} record(s)", count);
            total += count;
        }

        log::info!("ETL pipeline complete: {} record(s) loaded", total);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    struct MockExtractor(Vec<Vec<i32>>);

    impl Extractor for MockExtractor {
        type Item = Vec<i32>;
        fn extract(&self) -> impl Iterator<Item = Result<Self::Item>> + '_ {
            self.0.iter().cloned().map(Ok)
        }
    }

    struct FailingExtractor;

    impl Extractor for FailingExtractor {
        type Item = Vec<i32>;
        fn extract(&self) -> impl Iterator<Item = Result<Self::Item>> + '_ {
            std::iter::once(Err(EtlError::SourceEmpty {
                path: PathBuf::from("empty.csv"),
            }))
        }
    }

    struct DoubleTransformer;

    impl Transformer for DoubleTransformer {
        type Input = Vec<i32>;
        type Output = Vec<i32>;
        fn transform(&self, input: Self::Input) -> Result<Self::Output> {
            Ok(input.into_iter().map(|i| i * 2).collect())
        }
    }

    struct SumLoader(Arc<Mutex<i32>>);

    impl Loader for SumLoader {
        type Item = i32;
        async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
            let sum: i32 = items.iter().sum();
            *self.0.lock().unwrap() += sum;
            Ok(items.len())
        }
    }

    #[tokio::test]
    async fn test_pipeline() {
        let result = Arc::new(Mutex::new(0));

        let pipeline = Pipeline::new(
            MockExtractor(vec![vec![1, 2, 3], vec![4]]),
            DoubleTransformer,
            SumLoader(result.clone()),
        );

        let count = pipeline.run().await.unwrap();
        assert_eq!(count, 4);
        assert_eq!(*result.lock().unwrap(), 20); // (1+2+3+4)*2 = 20
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        let result = Arc::new(Mutex::new(0));

        let pipeline = Pipeline::new(
            MockExtractor(vec![vec![]]),
            DoubleTransformer,
            SumLoader(result.clone()),
        );

        let count = pipeline.run().await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_extract_error_propagates() {
        let result = Arc::new(Mutex::new(0));
        let pipeline = Pipeline::new(FailingExtractor, DoubleTransformer, SumLoader(result));

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, EtlError::SourceEmpty { .. }));
    }
}
