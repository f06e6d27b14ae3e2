//! Pagination types for the access-control platform.
//!
//! The platform reports listing progress through an `x-collection-range`
//! response header of the form `start-end/total`. [`fetch_all_grants`]
//! drives the page loop on top of [`crate::AccessTarget::list_grants`] and
//! guarantees termination even when the header is missing or malformed.

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use gatesync_core::AccessGrant;

use crate::error::ConnectorResult;
use crate::traits::AccessTarget;

/// Number of grants requested per page.
pub const GRANT_PAGE_SIZE: i64 = 250;

/// Hard cap on the number of pages read in one listing.
///
/// The grant population is expected to stay well below
/// `MAX_GRANT_PAGES * GRANT_PAGE_SIZE`; the cap stops the loop if the
/// platform keeps reporting more data than it serves.
const MAX_GRANT_PAGES: usize = 10;

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-(\d+)/(\d+)$").expect("range pattern is valid"));

/// A single page request against the grant listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

/// Listing progress parsed from the `x-collection-range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRange {
    pub start: i64,
    pub end: i64,
    pub total: i64,
}

impl CollectionRange {
    /// Parse a `start-end/total` header value.
    ///
    /// Returns `None` for anything that does not match the expected shape;
    /// the caller treats that as "range unknown" and falls back to the
    /// empty-page and page-cap guards.
    #[must_use]
    pub fn parse(header: &str) -> Option<Self> {
        let captures = RANGE_RE.captures(header.trim())?;
        let start = captures.get(1)?.as_str().parse().ok()?;
        let end = captures.get(2)?.as_str().parse().ok()?;
        let total = captures.get(3)?.as_str().parse().ok()?;
        Some(Self { start, end, total })
    }

    /// Whether this range covers the end of the collection.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.end >= self.total
    }
}

/// One page of the grant listing.
#[derive(Debug, Clone)]
pub struct GrantPage {
    pub grants: Vec<AccessGrant>,
    /// `None` when the range header was missing or malformed.
    pub range: Option<CollectionRange>,
}

/// Fetch every grant from the target by walking the paginated listing.
///
/// The loop advances the offset by [`GRANT_PAGE_SIZE`] and stops at the
/// first of: a range header reporting the collection is complete, an empty
/// page, or the [`MAX_GRANT_PAGES`] safety cap.
///
/// # Errors
///
/// Returns the first page fetch failure; pages read so far are discarded.
pub async fn fetch_all_grants(target: &dyn AccessTarget) -> ConnectorResult<Vec<AccessGrant>> {
    let mut all_grants = Vec::new();
    let mut offset: i64 = 0;
    let mut pages_read: usize = 0;

    loop {
        let page = target
            .list_grants(PageRequest {
                limit: GRANT_PAGE_SIZE,
                offset,
            })
            .await?;
        pages_read += 1;

        let fetched = page.grants.len();
        all_grants.extend(page.grants);

        if fetched == 0 {
            break;
        }

        match page.range {
            Some(range) if range.is_complete() => break,
            Some(_) => {}
            None => {
                // Range unknown: keep reading until an empty page or the
                // page cap ends the loop.
                warn!(offset, "grant listing returned no usable collection range");
            }
        }

        if pages_read >= MAX_GRANT_PAGES {
            warn!(
                fetched = all_grants.len(),
                "reached page safety cap while listing grants, stopping fetch"
            );
            break;
        }

        offset += GRANT_PAGE_SIZE;
    }

    Ok(all_grants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use async_trait::async_trait;
    use gatesync_core::{GrantId, GroupId, NewGrant};
    use std::sync::Mutex;

    #[test]
    fn test_parse_well_formed_range() {
        let range = CollectionRange::parse("0-250/617").unwrap();
        assert_eq!(range.start, 0);
        assert_eq!(range.end, 250);
        assert_eq!(range.total, 617);
        assert!(!range.is_complete());
    }

    #[test]
    fn test_parse_complete_range() {
        let range = CollectionRange::parse("500-617/617").unwrap();
        assert!(range.is_complete());
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        assert!(CollectionRange::parse(" 0-10/10 ").is_some());
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        assert!(CollectionRange::parse("").is_none());
        assert!(CollectionRange::parse("garbage").is_none());
        assert!(CollectionRange::parse("0-10").is_none());
        assert!(CollectionRange::parse("0-10/").is_none());
        assert!(CollectionRange::parse("-5-10/20").is_none());
        assert!(CollectionRange::parse("a-b/c").is_none());
    }

    fn make_grant(id: i64) -> AccessGrant {
        AccessGrant {
            id: GrantId::new(id),
            email: Some(format!("worker{id}@example.com")),
            name: Some(format!("GateSync worker{id}")),
            group_id: GroupId::new(1),
            valid_from: None,
            valid_until: None,
        }
    }

    /// Serves a scripted sequence of pages and records the offsets asked for.
    struct ScriptedTarget {
        pages: Vec<GrantPage>,
        offsets: Mutex<Vec<i64>>,
    }

    impl ScriptedTarget {
        fn new(pages: Vec<GrantPage>) -> Self {
            Self {
                pages,
                offsets: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AccessTarget for ScriptedTarget {
        async fn list_grants(&self, page: PageRequest) -> ConnectorResult<GrantPage> {
            let mut offsets = self.offsets.lock().unwrap();
            offsets.push(page.offset);
            let index = offsets.len() - 1;
            Ok(self.pages.get(index).cloned().unwrap_or(GrantPage {
                grants: Vec::new(),
                range: None,
            }))
        }

        async fn create_grant(&self, _grant: NewGrant) -> ConnectorResult<()> {
            Err(ConnectorError::invalid_configuration("not implemented"))
        }

        async fn delete_grant(&self, _id: GrantId) -> ConnectorResult<()> {
            Err(ConnectorError::invalid_configuration("not implemented"))
        }
    }

    #[tokio::test]
    async fn test_stops_when_range_reports_complete() {
        let target = ScriptedTarget::new(vec![
            GrantPage {
                grants: vec![make_grant(1), make_grant(2)],
                range: CollectionRange::parse("0-250/400"),
            },
            GrantPage {
                grants: vec![make_grant(3)],
                range: CollectionRange::parse("250-400/400"),
            },
        ]);

        let grants = fetch_all_grants(&target).await.unwrap();
        assert_eq!(grants.len(), 3);
        assert_eq!(*target.offsets.lock().unwrap(), vec![0, 250]);
    }

    #[tokio::test]
    async fn test_stops_on_empty_page_when_range_unknown() {
        let target = ScriptedTarget::new(vec![
            GrantPage {
                grants: vec![make_grant(1)],
                range: None,
            },
            GrantPage {
                grants: Vec::new(),
                range: None,
            },
        ]);

        let grants = fetch_all_grants(&target).await.unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(*target.offsets.lock().unwrap(), vec![0, 250]);
    }

    #[tokio::test]
    async fn test_page_cap_stops_runaway_listing() {
        // Every page claims there is more data than it serves.
        let pages = (0..50)
            .map(|i| GrantPage {
                grants: vec![make_grant(i)],
                range: CollectionRange::parse("0-1/999999"),
            })
            .collect();
        let target = ScriptedTarget::new(pages);

        let grants = fetch_all_grants(&target).await.unwrap();
        assert_eq!(grants.len(), 10);
        assert_eq!(target.offsets.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_offsets_advance_by_page_size() {
        let pages = (0..3)
            .map(|i| GrantPage {
                grants: vec![make_grant(i)],
                range: if i == 2 {
                    CollectionRange::parse("500-750/750")
                } else {
                    CollectionRange::parse("0-250/750")
                },
            })
            .collect();
        let target = ScriptedTarget::new(pages);

        let grants = fetch_all_grants(&target).await.unwrap();
        assert_eq!(grants.len(), 3);
        assert_eq!(*target.offsets.lock().unwrap(), vec![0, 250, 500]);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        struct FailingTarget;

        #[async_trait]
        impl AccessTarget for FailingTarget {
            async fn list_grants(&self, _page: PageRequest) -> ConnectorResult<GrantPage> {
                Err(ConnectorError::connection_failed("boom"))
            }

            async fn create_grant(&self, _grant: NewGrant) -> ConnectorResult<()> {
                Ok(())
            }

            async fn delete_grant(&self, _id: GrantId) -> ConnectorResult<()> {
                Ok(())
            }
        }

        let err = fetch_all_grants(&FailingTarget).await.unwrap_err();
        assert!(matches!(err, ConnectorError::ConnectionFailed { .. }));
    }
}
