//! Domain model shared by the reconciliation engine and the platform
//! connectors.
//!
//! The workforce-compliance platform ("Source") supplies [`Worker`],
//! [`Induction`] and [`Contractor`] records; the access-control platform
//! ("Target") holds [`AccessGrant`] records. Wire-format concerns stay in
//! the connector crates; everything here is already decoded.

use chrono::{DateTime, Utc};

use crate::eligibility::Eligibility;
use crate::ids::{ContractorId, GrantId, GroupId, InductionId, RecordId, WorkerId};
use crate::label::{simple_grant_label, GrantPolicy};

/// A worker in the workforce-compliance platform, together with the
/// contractor records needed to evaluate eligibility.
#[derive(Debug, Clone, PartialEq)]
pub struct Worker {
    pub id: WorkerId,
    /// Email address, the loose join key against access grants.
    pub email: String,
    pub first_name: String,
    /// Worker-level compliance flag as reported by the platform.
    pub is_compliant: bool,
    /// Induction records; overlapping or disjoint windows are both possible.
    pub inductions: Vec<Induction>,
    /// Reference to the worker's primary contractor, as reported by the
    /// platform. Carries the display name used in grant labels.
    pub primary_contractor: Option<ContractorRef>,
    /// The matched contractor record. `None` until the source connector has
    /// joined workers to contractors, or when the join found no match.
    pub contractor: Option<Contractor>,
}

/// A dated compliance/training record with a validity window.
#[derive(Debug, Clone, PartialEq)]
pub struct Induction {
    pub id: InductionId,
    pub inducted_on: DateTime<Utc>,
    pub expires_on: DateTime<Utc>,
}

/// Lightweight contractor reference carried on a worker record.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractorRef {
    pub id: ContractorId,
    pub display_name: String,
}

/// A contractor in the workforce-compliance platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Contractor {
    pub id: ContractorId,
    /// Contractor-level compliance flag as reported by the platform.
    pub is_compliant: bool,
    /// Compliance records (insurances, certificates) with expiry dates.
    pub records: Vec<ComplianceRecord>,
}

/// A single contractor compliance record.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceRecord {
    pub id: RecordId,
    pub expires_on: DateTime<Utc>,
}

/// An existing access grant in the access-control platform.
///
/// Issuer and created/updated metadata exist on the wire but are not
/// consumed by the reconciliation logic, so the access connector drops
/// them when decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessGrant {
    pub id: GrantId,
    /// Email the grant was issued to. The platform allows grants without
    /// one; such grants can never match a worker.
    pub email: Option<String>,
    /// Display label. The segment before the first `:` identifies the
    /// issuing integration and the worker; the rest carries the window.
    pub name: Option<String>,
    pub group_id: GroupId,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

/// Payload for creating a new access grant.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGrant {
    pub email: String,
    pub name: String,
    pub group_id: GroupId,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl NewGrant {
    /// Build the grant payload for a worker's computed eligibility, using
    /// the full display label (prefix, first name, contractor, email and
    /// window dates).
    #[must_use]
    pub fn from_eligibility(eligibility: &Eligibility, policy: &GrantPolicy) -> Self {
        Self {
            email: eligibility.email.clone(),
            name: eligibility.label.clone(),
            group_id: policy.group_id,
            valid_from: eligibility.valid_from,
            valid_until: eligibility.valid_to,
        }
    }

    /// Build a grant payload from a bare email and window, using the simple
    /// display label (prefix and email only).
    #[must_use]
    pub fn simple(
        email: impl Into<String>,
        valid_from: Option<DateTime<Utc>>,
        valid_until: Option<DateTime<Utc>>,
        policy: &GrantPolicy,
    ) -> Self {
        let email = email.into();
        Self {
            name: simple_grant_label(&policy.name_prefix, &email, valid_from, valid_until),
            email,
            group_id: policy.group_id,
            valid_from,
            valid_until,
        }
    }
}
