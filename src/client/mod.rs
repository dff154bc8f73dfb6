//! Document store clients.
//!
//! [`DocumentStore`] is the seam between the pipeline and a concrete backend.
//! [`StoreClient`] speaks the Elasticsearch-compatible REST API over HTTP;
//! [`MemoryStore`] keeps everything in process.

mod auth;
mod memory;
mod store;

pub use auth::Auth;
pub use memory::MemoryStore;
pub use store::StoreClient;

use crate::error::StoreError;
use crate::etl::Record;
use std::future::Future;

/// A stored document as returned by a text search
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub source: Record,
}

/// Capabilities the pipeline needs from a backing document store
pub trait DocumentStore: Send + Sync {
    /// Names of the text indexes that exist on `collection`.
    ///
    /// A collection that does not exist yet has no indexes.
    fn index_information(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Create a text index called `name` over `field`, creating the collection if needed
    fn create_text_index(
        &self,
        collection: &str,
        field: &str,
        name: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert all documents in one bulk request
    fn insert_many(
        &self,
        collection: &str,
        documents: &[Record],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Documents whose `field` contains `phrase`, best match first
    fn find_text(
        &self,
        collection: &str,
        field: &str,
        phrase: &str,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;
}
