//! Collaborator traits for the reconciliation engine.
//!
//! The engine depends on these three seams only; the production
//! implementations live in `gatesync-connector-compliance` (workforce
//! platform), `gatesync-connector-access` (access platform) and
//! `gatesync-engine::sink` (buffered error delivery). Tests substitute
//! hand-written fakes.

use async_trait::async_trait;

use gatesync_core::{AccessGrant, Contractor, GrantId, NewGrant, Worker};

use crate::error::ConnectorResult;
use crate::paging::{GrantPage, PageRequest};

/// Read access to the workforce-compliance platform ("Source").
#[async_trait]
pub trait WorkforceSource: Send + Sync {
    /// List all workers with their induction records.
    ///
    /// Workers returned here have no contractor attached yet.
    async fn list_workers(&self) -> ConnectorResult<Vec<Worker>>;

    /// List all contractors with their compliance records.
    async fn list_contractors(&self) -> ConnectorResult<Vec<Contractor>>;

    /// List workers with their primary contractor joined in.
    ///
    /// The join matches `Worker::primary_contractor` against the contractor
    /// listing by id. Workers whose reference matches nothing keep
    /// `contractor = None`; eligibility evaluation turns that into a hard
    /// per-worker error.
    async fn list_workers_with_contractors(&self) -> ConnectorResult<Vec<Worker>>;
}

/// Mutating access to the access-control platform ("Target").
#[async_trait]
pub trait AccessTarget: Send + Sync {
    /// Fetch one page of the grant listing.
    async fn list_grants(&self, page: PageRequest) -> ConnectorResult<GrantPage>;

    /// Create a new access grant.
    async fn create_grant(&self, grant: NewGrant) -> ConnectorResult<()>;

    /// Delete an access grant by id.
    async fn delete_grant(&self, id: GrantId) -> ConnectorResult<()>;
}

/// Collects failure messages during a run for later delivery.
///
/// Recording never fails and never aborts the run; delivery happens in
/// [`ErrorSink::flush`], typically once per run.
#[async_trait]
pub trait ErrorSink: Send + Sync {
    /// Record a failure message, timestamped at the moment of the call.
    async fn record(&self, message: &str);

    /// Deliver all accumulated messages as a single notification and clear
    /// the buffer.
    async fn flush(&self) -> ConnectorResult<()>;
}
