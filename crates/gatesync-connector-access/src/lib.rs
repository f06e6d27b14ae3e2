//! # gatesync-connector-access
//!
//! [`AccessTarget`](gatesync_connector::AccessTarget) implementation for the
//! access-control platform: the paginated grant listing with its
//! `x-collection-range` progress header, grant creation and grant deletion.

pub mod client;
pub mod models;

pub use client::{AccessClient, AccessConfig};
