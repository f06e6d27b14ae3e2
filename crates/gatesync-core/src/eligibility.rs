//! Eligibility evaluation.
//!
//! Pure computation of a worker's access eligibility window from induction
//! and contractor compliance records. No I/O; the caller supplies "now" so
//! runs are reproducible in tests.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::ids::WorkerId;
use crate::label::{grant_label, GrantPolicy};
use crate::model::Worker;

/// A worker's computed eligibility for the current run.
///
/// Recomputed on every reconciliation run and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Eligibility {
    pub worker_id: WorkerId,
    pub email: String,
    /// Earliest induction start among inductions that have not yet expired,
    /// absent when none qualify.
    pub valid_from: Option<DateTime<Utc>>,
    /// Latest induction expiry across all inductions, expired or not.
    pub valid_to: Option<DateTime<Utc>>,
    /// Whether the worker should hold a grant right now.
    pub is_compliant: bool,
    /// Full display label for the worker's grant.
    pub label: String,
}

/// Per-worker evaluation failure.
#[derive(Debug, Error)]
pub enum EligibilityError {
    /// The worker carries no matched contractor. This is a data fault in
    /// the source platform, not a compliance state: the worker is reported
    /// and excluded from the run rather than treated as non-compliant.
    #[error("worker {worker_id} ({email}) has no matched contractor")]
    MissingContractor { worker_id: WorkerId, email: String },
}

/// Evaluate a worker's eligibility window as of `now`.
///
/// The window start is the earliest induction start among inductions whose
/// expiry date is strictly after today; the window end is the latest
/// induction expiry regardless of whether it has passed. Contractor
/// compliance records gate presence only: a contractor with no records
/// makes the worker non-compliant, but record expiry dates never feed the
/// window end.
///
/// # Errors
///
/// Returns [`EligibilityError::MissingContractor`] when the worker has no
/// matched contractor or no primary contractor reference.
pub fn evaluate(
    worker: &Worker,
    policy: &GrantPolicy,
    now: DateTime<Utc>,
) -> Result<Eligibility, EligibilityError> {
    let (primary, contractor) = match (&worker.primary_contractor, &worker.contractor) {
        (Some(primary), Some(contractor)) => (primary, contractor),
        _ => {
            return Err(EligibilityError::MissingContractor {
                worker_id: worker.id,
                email: worker.email.clone(),
            })
        }
    };

    let today = now.date_naive();

    let valid_from = worker
        .inductions
        .iter()
        .filter(|induction| induction.expires_on.date_naive() > today)
        .map(|induction| induction.inducted_on)
        .min();

    let induction_expiry = worker
        .inductions
        .iter()
        .map(|induction| induction.expires_on)
        .max();

    // Consulted for presence only; see the window rule above.
    let record_expiry = contractor
        .records
        .iter()
        .map(|record| record.expires_on)
        .max();

    let (valid_from, valid_to, is_compliant) = match (valid_from, induction_expiry, record_expiry)
    {
        (Some(from), Some(to), Some(_)) => {
            let compliant = worker.is_compliant
                && contractor.is_compliant
                && to.date_naive() >= today
                && from.date_naive() <= today;
            (Some(from), Some(to), compliant)
        }
        // Any absent endpoint (or a contractor with no records at all)
        // means there is no usable window.
        _ => (None, None, false),
    };

    let label = grant_label(
        &policy.name_prefix,
        &worker.first_name,
        &primary.display_name,
        &worker.email,
        valid_from,
        valid_to,
    );

    Ok(Eligibility {
        worker_id: worker.id,
        email: worker.email.clone(),
        valid_from,
        valid_to,
        is_compliant,
        label,
    })
}
