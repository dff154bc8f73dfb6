//! Core ETL (Extract, Transform, Load) abstractions
//!
//! Sources are extracted into [`Table`]s, transformed into [`Record`]s and
//! loaded in chunks into a [`Storage`](crate::storage::Storage).

mod extract;
mod load;
mod pipeline;
mod table;
mod transform;

pub use extract::{DataSource, Extractor, Source, SourceExtractor};
pub use load::{ChunkedLoader, Loader};
pub use pipeline::Pipeline;
pub use table::{Column, Record, Table};
pub use transform::{RowRecordTransformer, Transformer};
