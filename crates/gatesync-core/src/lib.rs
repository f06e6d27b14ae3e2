//! # gatesync-core
//!
//! Domain model and pure reconciliation logic for gatesync: strongly typed
//! identifiers, the worker/contractor/grant model, eligibility evaluation,
//! grant labelling and the date comparisons the diff relies on.
//!
//! Everything in this crate is side-effect free. Talking to the two
//! platforms lives in the connector crates; orchestration lives in
//! `gatesync-engine`.

pub mod dates;
pub mod eligibility;
pub mod ids;
pub mod label;
pub mod model;

pub use dates::dates_equal_lenient;
pub use eligibility::{evaluate, Eligibility, EligibilityError};
pub use ids::{ContractorId, GrantId, GroupId, InductionId, RecordId, WorkerId};
pub use label::{
    grant_label, has_name_prefix, identity_segment, same_identity, simple_grant_label, GrantPolicy,
};
pub use model::{
    AccessGrant, ComplianceRecord, Contractor, ContractorRef, Induction, NewGrant, Worker,
};
