//! # gatesync-engine
//!
//! The reconciliation core: the desired-vs-actual diff ([`plan`]), the
//! rate-limited mutation batches ([`batch`]), buffered failure delivery
//! ([`sink`]) and the run orchestrator ([`engine`]) tying them together.

pub mod batch;
pub mod engine;
pub mod error;
pub mod plan;
pub mod sink;
pub mod summary;

pub use batch::{run_with_rate_limit, BatchLimits};
pub use engine::{EngineConfig, ReconcileEngine};
pub use error::{EngineError, EngineResult};
pub use plan::{build_plan, GrantUpdate, ReconcilePlan};
pub use sink::{BufferedErrorSink, ErrorEntry, WebhookNotifier};
pub use summary::RunSummary;
