//! Reading sources and persisting records
//!
//! - CSV file sources
//! - Document collection storage with text index bootstrap

mod csv_file;
mod document;

pub use csv_file::CsvFileSource;
pub use document::DocumentStorage;

use crate::error::Result;
use crate::etl::Record;
use std::future::Future;

/// Persists a batch of records
pub trait Storage: Send + Sync {
    /// Write all records in one operation.
    ///
    /// # Errors
    /// `StorageWrite` if the batch could not be written. The batch is then
    /// treated as failed as a whole.
    fn save(&self, records: &[Record]) -> impl Future<Output = Result<()>> + Send;
}
