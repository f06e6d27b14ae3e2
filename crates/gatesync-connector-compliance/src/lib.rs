//! # gatesync-connector-compliance
//!
//! [`WorkforceSource`](gatesync_connector::WorkforceSource) implementation
//! for the workforce-compliance platform: worker and contractor listings
//! plus the primary-contractor join the engine consumes.

pub mod client;
pub mod models;

pub use client::{ComplianceClient, ComplianceConfig};
