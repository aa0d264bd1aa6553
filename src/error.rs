//! Errors that abort an import run.

use backlog_core::{IngestionReport, StoreError};
use backlog_feeds::FeedError;
use thiserror::Error;

/// Result type alias using the pipeline's error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal pipeline errors. Line and file level problems are reported in the
/// [`IngestionReport`] instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The log source could not be listed.
    #[error("log source error: {0}")]
    Feed(#[from] FeedError),

    /// The destination store failed. The file being written was rolled back;
    /// `report` covers the files committed before it.
    #[error("store error: {source}")]
    Store {
        #[source]
        source: StoreError,
        report: Box<IngestionReport>,
    },

    /// The file worker pool could not be started.
    #[error("worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    /// What the run had done before it failed, when known.
    pub fn report(&self) -> Option<&IngestionReport> {
        match self {
            PipelineError::Store { report, .. } => Some(report),
            _ => None,
        }
    }
}
