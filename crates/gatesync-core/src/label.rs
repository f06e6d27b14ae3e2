//! Grant display labels.
//!
//! Every grant issued by this integration carries a deterministic display
//! label. The segment before the first `:` is the stable identity key
//! (prefix, worker name, contractor, email); the remainder carries the
//! validity window and is expected to change as inductions are renewed.

use chrono::{DateTime, Utc};

use crate::ids::GroupId;

/// Grant issuing policy consumed by the reconciliation core.
///
/// `name_prefix` marks labels as belonging to this integration, both when
/// generating them and when recognising grants that are safe to remove.
/// `group_id` is the access group new grants are issued into.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantPolicy {
    pub name_prefix: String,
    pub group_id: GroupId,
}

/// Build the full display label for a worker's grant.
///
/// Format: `"{prefix} {first_name} {contractor} {email}: {from} - {to}"`
/// with the window dates rendered as `%Y-%m-%d` and absent dates rendered
/// as empty strings.
#[must_use]
pub fn grant_label(
    prefix: &str,
    first_name: &str,
    contractor_name: &str,
    email: &str,
    valid_from: Option<DateTime<Utc>>,
    valid_to: Option<DateTime<Utc>>,
) -> String {
    let from = format_label_date(valid_from);
    let to = format_label_date(valid_to);
    format!("{prefix} {first_name} {contractor_name} {email}: {from} - {to}")
}

/// Build the simple display label used for grants created from a bare
/// email and window, without a worker record behind them.
///
/// The window dates use the default timestamp rendering rather than the
/// `%Y-%m-%d` form of [`grant_label`].
#[must_use]
pub fn simple_grant_label(
    prefix: &str,
    email: &str,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
) -> String {
    let from = valid_from.map(|d| d.to_string()).unwrap_or_default();
    let until = valid_until.map(|d| d.to_string()).unwrap_or_default();
    format!("{prefix} {email}: {from} - {until}")
}

/// The stable identity segment of a label: everything before the first `:`.
///
/// Labels without a `:` are their own identity segment.
#[must_use]
pub fn identity_segment(label: &str) -> &str {
    label.split(':').next().unwrap_or(label)
}

/// Compare the identity segments of two labels, case-insensitively.
#[must_use]
pub fn same_identity(a: &str, b: &str) -> bool {
    identity_segment(a).to_lowercase() == identity_segment(b).to_lowercase()
}

/// Whether a label was issued by the integration owning `prefix`.
#[must_use]
pub fn has_name_prefix(label: &str, prefix: &str) -> bool {
    label.to_lowercase().starts_with(&prefix.to_lowercase())
}

fn format_label_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
