//! Diff between desired eligibility state and the Target's grant listing.

use std::collections::{HashMap, HashSet};

use gatesync_core::{
    dates_equal_lenient, has_name_prefix, same_identity, AccessGrant, Eligibility, GrantId,
    GrantPolicy,
};

/// One grant whose identity or window no longer matches the worker's
/// eligibility. The Target has no in-place update, so applying this means
/// deleting `existing` and creating a grant from `replacement`.
#[derive(Debug, Clone)]
pub struct GrantUpdate {
    pub existing: AccessGrant,
    pub replacement: Eligibility,
}

/// The mutations one reconciliation run intends to apply.
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    /// Compliant workers with no grant at all.
    pub to_create: Vec<Eligibility>,
    /// Grants whose identity segment or validity window drifted.
    pub to_update: Vec<GrantUpdate>,
    /// Grants for non-compliant workers, plus this integration's grants
    /// whose email matches no compliant worker.
    pub to_delete: Vec<AccessGrant>,
}

impl ReconcilePlan {
    /// Whether the run has nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Build the mutation plan for one run.
///
/// Matching is by case-insensitive email; when several grants share an email
/// the first one in listing order is the match and the rest are left alone.
/// Grants whose email belongs to a worker in `excluded_emails` (workers whose
/// evaluation hard-failed) are shielded from every mutation: without a
/// trustworthy desired state, deleting their grants would be guesswork.
#[must_use]
pub fn build_plan(
    eligibilities: &[Eligibility],
    grants: &[AccessGrant],
    policy: &GrantPolicy,
    excluded_emails: &[String],
) -> ReconcilePlan {
    let excluded: HashSet<String> = excluded_emails
        .iter()
        .map(|email| email.to_lowercase())
        .collect();

    let mut compliant_by_email: HashMap<String, &Eligibility> = HashMap::new();
    let mut non_compliant_emails: HashSet<String> = HashSet::new();
    for eligibility in eligibilities {
        let key = eligibility.email.to_lowercase();
        if eligibility.is_compliant {
            compliant_by_email.entry(key).or_insert(eligibility);
        } else {
            non_compliant_emails.insert(key);
        }
    }

    let mut plan = ReconcilePlan::default();

    // Pass 1: every compliant worker either keeps its grant, gets it
    // replaced, or gets a fresh one.
    let mut matched: HashSet<GrantId> = HashSet::new();
    for eligibility in eligibilities.iter().filter(|e| e.is_compliant) {
        let key = eligibility.email.to_lowercase();
        let existing = grants.iter().find(|grant| {
            grant
                .email
                .as_deref()
                .is_some_and(|email| email.to_lowercase() == key)
        });
        match existing {
            Some(grant) => {
                matched.insert(grant.id);
                if needs_update(eligibility, grant) {
                    plan.to_update.push(GrantUpdate {
                        existing: grant.clone(),
                        replacement: eligibility.clone(),
                    });
                }
            }
            None => plan.to_create.push(eligibility.clone()),
        }
    }

    // Pass 2: grants not claimed by a compliant worker.
    for grant in grants {
        if matched.contains(&grant.id) {
            continue;
        }
        let key = grant.email.as_ref().map(|email| email.to_lowercase());

        if let Some(key) = &key {
            if excluded.contains(key) {
                continue;
            }
            if non_compliant_emails.contains(key) {
                plan.to_delete.push(grant.clone());
                continue;
            }
        }

        // Grants carrying our prefix but matching no compliant worker belong
        // to workers that vanished from the source. Anything else was issued
        // by someone else and is not ours to touch.
        let ours = grant
            .name
            .as_deref()
            .is_some_and(|name| has_name_prefix(name, &policy.name_prefix));
        let claimed = key
            .as_ref()
            .is_some_and(|key| compliant_by_email.contains_key(key));
        if ours && !claimed {
            plan.to_delete.push(grant.clone());
        }
    }

    plan
}

/// Whether an existing grant must be replaced for this eligibility.
///
/// Order matters only for short-circuiting: identity segment first, then the
/// two window endpoints under the one-day-tolerant date comparison.
fn needs_update(eligibility: &Eligibility, grant: &AccessGrant) -> bool {
    let grant_label = grant.name.as_deref().unwrap_or("");
    if !same_identity(&eligibility.label, grant_label) {
        return true;
    }
    if !dates_equal_lenient(grant.valid_from, eligibility.valid_from) {
        return true;
    }
    !dates_equal_lenient(grant.valid_until, eligibility.valid_to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use gatesync_core::{grant_label, GroupId, WorkerId};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, d, 9, 0, 0).unwrap()
    }

    fn policy() -> GrantPolicy {
        GrantPolicy {
            name_prefix: "GATE".to_string(),
            group_id: GroupId::new(88),
        }
    }

    fn eligibility(email: &str, compliant: bool, window: Option<(u32, u32)>) -> Eligibility {
        let (valid_from, valid_to) = match window {
            Some((from, to)) => (Some(day(from)), Some(day(to))),
            None => (None, None),
        };
        Eligibility {
            worker_id: WorkerId::new(1),
            email: email.to_string(),
            valid_from,
            valid_to,
            is_compliant: compliant,
            label: grant_label("GATE", "Amy", "Acme", email, valid_from, valid_to),
        }
    }

    fn grant(id: i64, email: Option<&str>, name: Option<&str>, window: Option<(u32, u32)>) -> AccessGrant {
        let (valid_from, valid_until) = match window {
            Some((from, to)) => (Some(day(from)), Some(day(to))),
            None => (None, None),
        };
        AccessGrant {
            id: GrantId::new(id),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
            group_id: GroupId::new(88),
            valid_from,
            valid_until,
        }
    }

    /// A grant that exactly mirrors the eligibility a worker would compute.
    fn matching_grant(id: i64, eligibility: &Eligibility) -> AccessGrant {
        AccessGrant {
            id: GrantId::new(id),
            email: Some(eligibility.email.clone()),
            name: Some(eligibility.label.clone()),
            group_id: GroupId::new(88),
            valid_from: eligibility.valid_from,
            valid_until: eligibility.valid_to,
        }
    }

    #[test]
    fn test_compliant_worker_without_grant_is_created() {
        let desired = vec![eligibility("amy@example.com", true, Some((1, 20)))];
        let plan = build_plan(&desired, &[], &policy(), &[]);

        assert_eq!(plan.to_create.len(), 1);
        assert!(plan.to_update.is_empty());
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn test_matching_grant_leaves_empty_plan() {
        let desired = vec![eligibility("amy@example.com", true, Some((1, 20)))];
        let actual = vec![matching_grant(10, &desired[0])];
        let plan = build_plan(&desired, &actual, &policy(), &[]);

        assert!(plan.is_empty());
    }

    #[test]
    fn test_email_match_is_case_insensitive() {
        let desired = vec![eligibility("Amy@Example.com", true, Some((1, 20)))];
        let mut existing = matching_grant(10, &desired[0]);
        existing.email = Some("amy@example.com".to_string());
        let plan = build_plan(&desired, &[existing], &policy(), &[]);

        assert!(plan.is_empty());
    }

    #[test]
    fn test_window_drift_beyond_one_day_is_updated() {
        let desired = vec![eligibility("amy@example.com", true, Some((10, 20)))];
        let mut existing = matching_grant(10, &desired[0]);
        existing.valid_from = Some(day(13));
        let plan = build_plan(&desired, &[existing], &policy(), &[]);

        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].existing.id, GrantId::new(10));
        assert!(plan.to_create.is_empty());
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn test_one_day_skew_is_tolerated() {
        let desired = vec![eligibility("amy@example.com", true, Some((10, 20)))];
        let mut existing = matching_grant(10, &desired[0]);
        existing.valid_from = Some(day(11));
        existing.valid_until = Some(day(19));
        let plan = build_plan(&desired, &[existing], &policy(), &[]);

        assert!(plan.is_empty());
    }

    #[test]
    fn test_changed_identity_segment_is_updated() {
        let desired = vec![eligibility("amy@example.com", true, Some((10, 20)))];
        let mut existing = matching_grant(10, &desired[0]);
        // Same window, but the label names a different worker/contractor.
        existing.name = Some(grant_label(
            "GATE",
            "Amelia",
            "Acme",
            "amy@example.com",
            existing.valid_from,
            existing.valid_until,
        ));
        let plan = build_plan(&desired, &[existing], &policy(), &[]);

        assert_eq!(plan.to_update.len(), 1);
    }

    #[test]
    fn test_identity_comparison_is_case_insensitive() {
        let desired = vec![eligibility("amy@example.com", true, Some((10, 20)))];
        let mut existing = matching_grant(10, &desired[0]);
        existing.name = existing.name.map(|name| name.to_uppercase());
        let plan = build_plan(&desired, &[existing], &policy(), &[]);

        assert!(plan.is_empty());
    }

    #[test]
    fn test_non_compliant_worker_grant_is_deleted() {
        let desired = vec![eligibility("bob@example.com", false, None)];
        let actual = vec![grant(
            11,
            Some("bob@example.com"),
            Some("Visitor pass"),
            Some((1, 30)),
        )];
        let plan = build_plan(&desired, &actual, &policy(), &[]);

        // Deletion by worker match applies even to grants without our prefix.
        assert_eq!(plan.to_delete.len(), 1);
        assert_eq!(plan.to_delete[0].id, GrantId::new(11));
        assert!(plan.to_create.is_empty());
    }

    #[test]
    fn test_vanished_worker_grant_with_prefix_is_deleted() {
        let actual = vec![grant(
            12,
            Some("gone@example.com"),
            Some("GATE Gone Acme gone@example.com: 2026-01-01 - 2026-02-01"),
            Some((1, 2)),
        )];
        let plan = build_plan(&[], &actual, &policy(), &[]);

        assert_eq!(plan.to_delete.len(), 1);
    }

    #[test]
    fn test_foreign_grant_without_prefix_is_left_alone() {
        let actual = vec![grant(
            13,
            Some("visitor@example.com"),
            Some("Reception visitor badge"),
            None,
        )];
        let plan = build_plan(&[], &actual, &policy(), &[]);

        assert!(plan.is_empty());
    }

    #[test]
    fn test_prefixed_grant_without_email_is_deleted() {
        let actual = vec![
            grant(14, None, Some("GATE orphan: 2026-01-01 - 2026-02-01"), None),
            grant(15, None, Some("Maintenance door code"), None),
        ];
        let plan = build_plan(&[], &actual, &policy(), &[]);

        assert_eq!(plan.to_delete.len(), 1);
        assert_eq!(plan.to_delete[0].id, GrantId::new(14));
    }

    #[test]
    fn test_excluded_worker_grants_are_shielded() {
        let actual = vec![grant(
            16,
            Some("broken@example.com"),
            Some("GATE Broken Acme broken@example.com: 2026-01-01 - 2026-02-01"),
            Some((1, 2)),
        )];
        let plan = build_plan(
            &[],
            &actual,
            &policy(),
            &["broken@example.com".to_string()],
        );

        assert!(plan.is_empty());
    }

    #[test]
    fn test_duplicate_grants_first_match_wins() {
        let desired = vec![eligibility("amy@example.com", true, Some((10, 20)))];
        let first = matching_grant(20, &desired[0]);
        let mut second = matching_grant(21, &desired[0]);
        second.valid_until = Some(day(28));
        let plan = build_plan(&desired, &[first, second], &policy(), &[]);

        // The first grant matches exactly; the duplicate is not claimed but
        // its email still belongs to a compliant worker, so it survives.
        assert!(plan.is_empty());
    }

    #[test]
    fn test_mixed_population_produces_all_three_buckets() {
        let compliant_new = eligibility("new@example.com", true, Some((1, 25)));
        let compliant_drifted = eligibility("drift@example.com", true, Some((5, 25)));
        let non_compliant = eligibility("lapsed@example.com", false, None);

        let mut drifted_grant = matching_grant(30, &compliant_drifted);
        drifted_grant.valid_until = Some(day(12));

        let actual = vec![
            drifted_grant,
            grant(31, Some("lapsed@example.com"), Some("GATE lapsed"), None),
            grant(
                32,
                Some("vanished@example.com"),
                Some("GATE Van Acme vanished@example.com: 2026-01-01 - 2026-02-01"),
                None,
            ),
        ];
        let desired = vec![compliant_new, compliant_drifted, non_compliant];
        let plan = build_plan(&desired, &actual, &policy(), &[]);

        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].email, "new@example.com");
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].replacement.email, "drift@example.com");
        let deleted: Vec<i64> = plan.to_delete.iter().map(|g| g.id.value()).collect();
        assert_eq!(deleted, vec![31, 32]);
    }
}
