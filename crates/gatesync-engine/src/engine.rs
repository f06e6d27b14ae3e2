//! Run orchestration: fetch both sides, evaluate, diff, apply.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use gatesync_connector::{fetch_all_grants, AccessTarget, ErrorSink, WorkforceSource};
use gatesync_core::{evaluate, GrantPolicy, NewGrant};

use crate::batch::{run_with_rate_limit, BatchLimits};
use crate::error::{EngineError, EngineResult};
use crate::plan::{build_plan, ReconcilePlan};
use crate::summary::RunSummary;

/// Engine configuration: the label/group policy plus mutation batching.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub policy: GrantPolicy,
    pub limits: BatchLimits,
}

/// Reconciles the access platform's grants against workforce eligibility.
///
/// The engine is stateless between runs; every run re-derives desired state
/// from the source and actual state from the target, so a failed or
/// cancelled run is corrected by simply running again.
pub struct ReconcileEngine {
    source: Arc<dyn WorkforceSource>,
    target: Arc<dyn AccessTarget>,
    errors: Arc<dyn ErrorSink>,
    config: EngineConfig,
}

/// Success counters shared by the mutation units of one run.
#[derive(Default)]
struct RunCounters {
    created: AtomicUsize,
    updated: AtomicUsize,
    deleted: AtomicUsize,
}

impl RunCounters {
    fn snapshot(&self) -> RunSummary {
        RunSummary {
            created: self.created.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
        }
    }
}

impl ReconcileEngine {
    pub fn new(
        source: Arc<dyn WorkforceSource>,
        target: Arc<dyn AccessTarget>,
        errors: Arc<dyn ErrorSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            source,
            target,
            errors,
            config,
        }
    }

    /// Execute one reconciliation run.
    ///
    /// Fetch failures abort the run before any mutation; individual mutation
    /// failures are recorded to the error sink and the run continues. Once
    /// `cancel` fires, in-flight requests unwind and no further batch starts;
    /// partially applied mutations are left for the next run to correct.
    ///
    /// # Errors
    ///
    /// [`EngineError::SourceFetch`] / [`EngineError::TargetFetch`] when a
    /// full-state listing fails, [`EngineError::Cancelled`] when the token
    /// fires first.
    pub async fn run(&self, cancel: CancellationToken) -> EngineResult<RunSummary> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        info!("starting reconciliation run");

        // 1. Fetch both sides concurrently; either failure aborts the run.
        let fetch = async {
            tokio::try_join!(
                async {
                    self.source
                        .list_workers_with_contractors()
                        .await
                        .map_err(EngineError::SourceFetch)
                },
                async {
                    fetch_all_grants(self.target.as_ref())
                        .await
                        .map_err(EngineError::TargetFetch)
                },
            )
        };
        let (workers, grants) = tokio::select! {
            () = cancel.cancelled() => return Err(EngineError::Cancelled),
            result = fetch => match result {
                Ok(state) => state,
                Err(err) => {
                    self.errors.record(&err.to_string()).await;
                    error!(error = %err, "state fetch failed, aborting run");
                    return Err(err);
                }
            },
        };
        info!(
            workers = workers.len(),
            grants = grants.len(),
            "fetched state from both platforms"
        );

        // 2. Evaluate eligibility. A worker that cannot be evaluated is
        //    reported and excluded from both sides of the diff; its grants
        //    must not be touched on the basis of missing data.
        let now = Utc::now();
        let mut eligibilities = Vec::with_capacity(workers.len());
        let mut excluded_emails = Vec::new();
        for worker in &workers {
            match evaluate(worker, &self.config.policy, now) {
                Ok(eligibility) => eligibilities.push(eligibility),
                Err(err) => {
                    warn!(worker_id = %worker.id, error = %err, "excluding worker from run");
                    self.errors.record(&err.to_string()).await;
                    excluded_emails.push(worker.email.clone());
                }
            }
        }

        // 3. Diff desired state against the grant listing.
        let plan = build_plan(&eligibilities, &grants, &self.config.policy, &excluded_emails);
        info!(
            create = plan.to_create.len(),
            update = plan.to_update.len(),
            delete = plan.to_delete.len(),
            "reconciliation plan built"
        );

        // 4. Apply, phase by phase.
        let summary = self.apply(&plan, &cancel).await?;
        info!(%summary, "reconciliation run complete");
        Ok(summary)
    }

    /// Apply a plan in four phases: deletes, creates, then the two legs of
    /// every update. Replacement creates start only after all update deletes
    /// have settled, so a replacement can never coexist with the grant it
    /// supersedes.
    async fn apply(
        &self,
        plan: &ReconcilePlan,
        cancel: &CancellationToken,
    ) -> EngineResult<RunSummary> {
        let counters = RunCounters::default();
        let policy = &self.config.policy;

        let deletes: Vec<_> = plan
            .to_delete
            .iter()
            .map(|grant| {
                let counters = &counters;
                async move {
                    match self.target.delete_grant(grant.id).await {
                        Ok(()) => {
                            info!(grant_id = %grant.id, "grant removed");
                            counters.deleted.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(err) => {
                            warn!(grant_id = %grant.id, error = %err, "grant delete failed");
                            self.errors
                                .record(&format!("failed to delete grant {}: {err}", grant.id))
                                .await;
                        }
                    }
                    Ok::<(), EngineError>(())
                }
            })
            .collect();
        self.run_batch(deletes, cancel).await?;

        let creates: Vec<_> = plan
            .to_create
            .iter()
            .map(|eligibility| {
                let grant = NewGrant::from_eligibility(eligibility, policy);
                let counters = &counters;
                async move {
                    match self.target.create_grant(grant).await {
                        Ok(()) => {
                            info!(email = %eligibility.email, "grant created");
                            counters.created.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(err) => {
                            warn!(email = %eligibility.email, error = %err, "grant create failed");
                            self.errors
                                .record(&format!(
                                    "failed to create grant for {}: {err}",
                                    eligibility.email
                                ))
                                .await;
                        }
                    }
                    Ok::<(), EngineError>(())
                }
            })
            .collect();
        self.run_batch(creates, cancel).await?;

        // Update deletes. Only eligibilities whose old grant actually went
        // away move on to the create leg.
        let survivors = Mutex::new(Vec::with_capacity(plan.to_update.len()));
        let update_deletes: Vec<_> = plan
            .to_update
            .iter()
            .map(|update| {
                let survivors = &survivors;
                async move {
                    match self.target.delete_grant(update.existing.id).await {
                        Ok(()) => survivors.lock().await.push(&update.replacement),
                        Err(err) => {
                            warn!(
                                grant_id = %update.existing.id,
                                error = %err,
                                "update delete leg failed"
                            );
                            self.errors
                                .record(&format!(
                                    "failed to replace grant {} for {}: {err}",
                                    update.existing.id, update.replacement.email
                                ))
                                .await;
                        }
                    }
                    Ok::<(), EngineError>(())
                }
            })
            .collect();
        self.run_batch(update_deletes, cancel).await?;

        let update_creates: Vec<_> = survivors
            .into_inner()
            .into_iter()
            .map(|eligibility| {
                let grant = NewGrant::from_eligibility(eligibility, policy);
                let counters = &counters;
                async move {
                    match self.target.create_grant(grant).await {
                        Ok(()) => {
                            info!(email = %eligibility.email, "grant replaced");
                            counters.updated.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(err) => {
                            warn!(email = %eligibility.email, error = %err, "update create leg failed");
                            self.errors
                                .record(&format!(
                                    "failed to recreate grant for {}: {err}",
                                    eligibility.email
                                ))
                                .await;
                        }
                    }
                    Ok::<(), EngineError>(())
                }
            })
            .collect();
        self.run_batch(update_creates, cancel).await?;

        Ok(counters.snapshot())
    }

    /// Run one phase's units through the rate limiter, bailing out when the
    /// cancellation token fires between or during batches.
    async fn run_batch<F>(&self, units: Vec<F>, cancel: &CancellationToken) -> EngineResult<()>
    where
        F: Future<Output = Result<(), EngineError>>,
    {
        if units.is_empty() {
            return Ok(());
        }
        tokio::select! {
            () = cancel.cancelled() => Err(EngineError::Cancelled),
            result = run_with_rate_limit(units, self.config.limits) => result.map(|_| ()),
        }
    }
}
