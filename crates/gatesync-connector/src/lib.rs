//! # gatesync-connector
//!
//! The seams between the reconciliation engine and the outside world:
//! the [`WorkforceSource`], [`AccessTarget`] and [`ErrorSink`] traits, the
//! [`ConnectorError`] taxonomy with transient/permanent classification,
//! and the pagination types for the access platform's grant listing.

pub mod error;
pub mod http;
pub mod paging;
pub mod traits;

pub use error::{ConnectorError, ConnectorResult};
pub use paging::{fetch_all_grants, CollectionRange, GrantPage, PageRequest, GRANT_PAGE_SIZE};
pub use traits::{AccessTarget, ErrorSink, WorkforceSource};
