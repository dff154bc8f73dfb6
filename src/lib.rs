//! CSV Document ETL
//!
//! Extracts CSV files into tables, turns rows into documents and bulk-loads
//! them in chunks into a document store with a text index on one field.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod etl;
pub mod search;
pub mod storage;

// Re-exports for convenience
pub use client::{Auth, DocumentStore, MemoryStore, StoreClient};
pub use config::{Config, StoreConfig};
pub use error::{EtlError, Result, StoreError};
pub use etl::{
    ChunkedLoader, DataSource, Extractor, Loader, Pipeline, Record, RowRecordTransformer, Source,
    SourceExtractor, Table, Transformer,
};
pub use search::{SearchHit, SearchTool};
pub use storage::{CsvFileSource, DocumentStorage, Storage};
