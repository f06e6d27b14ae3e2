//! Outcome counts for one reconciliation run.

use std::fmt;

/// Counts of successfully applied mutations in one run.
///
/// Failed items are not counted; they travel through the error sink. An
/// update counts only when both of its legs (delete and create) succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Grants created for compliant workers that had none.
    pub created: usize,
    /// Grants replaced because their identity or window drifted.
    pub updated: usize,
    /// Grants removed for non-compliant or vanished workers.
    pub deleted: usize,
}

impl RunSummary {
    /// Total number of applied mutations.
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "removed {}, added {}, updated {} grants",
            self.deleted, self.created, self.updated
        )
    }
}
