//! Error types for the pipeline stages and the document store driver

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by every pipeline stage
pub type Result<T, E = EtlError> = std::result::Result<T, E>;

/// Errors raised by the extract, transform and load stages.
///
/// No stage swallows these; they surface to the caller that drives the
/// pipeline, which treats the whole invocation as failed.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("source {path} is unavailable: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("source {path} has no header row")]
    SourceEmpty { path: PathBuf },
    #[error("source {path} is not valid CSV: {source}")]
    SourceMalformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("bulk insert into `{collection}` failed: {source}")]
    StorageWrite {
        collection: String,
        #[source]
        source: StoreError,
    },
    #[error("text index `{index}` bootstrap failed: {source}")]
    IndexBootstrap {
        index: String,
        #[source]
        source: StoreError,
    },
    #[error("text search for `{word}` failed: {source}")]
    Search {
        word: String,
        #[source]
        source: StoreError,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

/// Failures reported by a [`DocumentStore`](crate::client::DocumentStore) backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store responded {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("store rejected {failed} of {total} document(s): {reason}")]
    Rejected {
        failed: usize,
        total: usize,
        reason: String,
    },
    #[error("unexpected store response: {0}")]
    Response(String),
    #[error("{0}")]
    Backend(String),
}
