//! Error types for a benchmark run.

use bench_core::DistributionError;
use bench_store::StoreError;
use thiserror::Error;

/// Errors that can stop a load or a benchmark run.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Bad distribution or generation parameters.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Connecting to the store or preparing the collection failed.
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// The store rejected a batch during the load phase.
    ///
    /// Batches flushed before `batch` stay in the collection.
    #[error("Batch {batch} rejected: {source}")]
    WriteRejected {
        batch: u64,
        #[source]
        source: StoreError,
    },

    /// A benchmark query failed.
    #[error("Query {query} failed: {source}")]
    QueryFailed {
        query: &'static str,
        #[source]
        source: StoreError,
    },

    /// A person was about to reference a company id that was never inserted.
    #[error("Inconsistent reference: {0}")]
    InconsistentReference(String),

    /// Settings could not be loaded or are invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document read back from the store has an unexpected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] StoreError),

    /// Writing a report failed.
    #[error("Report error: {0}")]
    Report(#[from] std::io::Error),

    #[error("Report serialization error: {0}")]
    ReportFormat(#[from] serde_json::Error),
}

impl From<DistributionError> for BenchError {
    fn from(err: DistributionError) -> Self {
        match err {
            DistributionError::InvalidArgument(msg) => BenchError::InvalidArgument(msg),
        }
    }
}
