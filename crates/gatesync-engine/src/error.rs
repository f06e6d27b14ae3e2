//! Fatal failures that abort a reconciliation run.

use thiserror::Error;

use gatesync_connector::ConnectorError;

/// Errors that abort a run outright.
///
/// Only full-state fetch failures and cancellation land here. Per-item
/// mutation failures and per-worker evaluation failures are recorded to the
/// [`ErrorSink`](gatesync_connector::ErrorSink) and the run continues; the
/// failed item's intended change simply reappears in the next run's plan.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The workforce platform listing could not be fetched.
    #[error("failed to fetch workforce state: {0}")]
    SourceFetch(#[source] ConnectorError),

    /// The access platform grant listing could not be fetched.
    #[error("failed to fetch access grants: {0}")]
    TargetFetch(#[source] ConnectorError),

    /// The run was cancelled before it finished.
    #[error("reconciliation run cancelled")]
    Cancelled,
}

/// Convenience result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
