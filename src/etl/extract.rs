//! Data sources and the extractor that pulls tables from them

use super::Table;
use crate::error::Result;
use crate::storage::CsvFileSource;
use std::fmt;

/// One unit of raw input that can be loaded as a [`Table`]
pub trait DataSource: fmt::Display + Send + Sync {
    /// Read the whole source
    ///
    /// # Errors
    /// `SourceUnavailable` when the input cannot be opened, `SourceEmpty` when it
    /// has no header row, `SourceMalformed` when it cannot be parsed.
    fn load(&self) -> Result<Table>;
}

/// Every kind of source the pipeline knows how to read
#[derive(Clone, Debug)]
pub enum Source {
    CsvFile(CsvFileSource),
}

impl DataSource for Source {
    fn load(&self) -> Result<Table> {
        match self {
            Self::CsvFile(source) => source.load(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CsvFile(source) => write!(f, "{}", source),
        }
    }
}

impl From<CsvFileSource> for Source {
    fn from(source: CsvFileSource) -> Self {
        Self::CsvFile(source)
    }
}

/// Extractor trait for pulling items out of a set of sources
///
/// Extraction is lazy: nothing is read until the returned iterator is
/// advanced, and a failure surfaces as an `Err` item at that point. Each call
/// to `extract` starts again from the first source.
///
/// # Example
/// ```no_run
/// use csv_doc_etl::etl::{Extractor, Source, SourceExtractor};
/// use csv_doc_etl::storage::CsvFileSource;
///
/// # fn example() -> csv_doc_etl::Result<()> {
/// let sources = vec![Source::from(CsvFileSource::new("data/rounds.csv"))];
/// let extractor = SourceExtractor::new(sources);
/// for table in extractor.extract() {
///     println!("{:?}", table?.shape());
/// }
/// # Ok(())
/// # }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// A fresh, finite iterator over the extracted items in source order
    fn extract(&self) -> impl Iterator<Item = Result<Self::Item>> + '_;
}

/// Extracts one [`Table`] per data source, in order
pub struct SourceExtractor<S = Source> {
    sources: Vec<S>,
}

impl<S: DataSource> SourceExtractor<S> {
    pub fn new(sources: Vec<S>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[S] {
        &self.sources
    }
}

impl<S: DataSource> Extractor for SourceExtractor<S> {
    type Item = Table;

    fn extract(&self) -> impl Iterator<Item = Result<Table>> + '_ {
        self.sources.iter().map(|source| {
            log::debug!("Loading source {}", source);
            source.load()
        })
    }
}

impl<S: DataSource> fmt::Display for SourceExtractor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.sources.iter().map(ToString::to_string).collect();
        write!(f, "{}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use crate::etl::Column;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        name: &'static str,
        loads: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(name: &'static str, fail: bool) -> Self {
            Self {
                name,
                loads: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl fmt::Display for CountingSource {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.name)
        }
    }

    impl DataSource for CountingSource {
        fn load(&self) -> Result<Table> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EtlError::SourceEmpty {
                    path: PathBuf::from(self.name),
                });
            }
            Ok(Table::new(vec![Column::new(self.name, vec![json!(1)])]))
        }
    }

    #[test]
    fn test_extract_is_lazy() {
        let extractor = SourceExtractor::new(vec![
            CountingSource::new("a", false),
            CountingSource::new("b", false),
        ]);
        let mut tables = extractor.extract();
        assert_eq!(extractor.sources()[0].loads.load(Ordering::SeqCst), 0);

        tables.next().unwrap().unwrap();
        assert_eq!(extractor.sources()[0].loads.load(Ordering::SeqCst), 1);
        assert_eq!(extractor.sources()[1].loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_extract_preserves_order_and_restarts() {
        let extractor = SourceExtractor::new(vec![
            CountingSource::new("first", false),
            CountingSource::new("second", false),
        ]);
        for _ in 0..2 {
            let names: Vec<String> = extractor
                .extract()
                .map(|t| t.unwrap().columns()[0].name.clone())
                .collect();
            assert_eq!(names, vec!["first", "second"]);
        }
        assert_eq!(extractor.to_string(), "first, second");
    }

    #[test]
    fn test_error_does_not_stop_later_sources() {
        let extractor = SourceExtractor::new(vec![
            CountingSource::new("broken", true),
            CountingSource::new("fine", false),
        ]);
        let results: Vec<_> = extractor.extract().collect();
        assert!(matches!(results[0], Err(EtlError::SourceEmpty { .. })));
        assert!(results[1].is_ok());
    }
}
