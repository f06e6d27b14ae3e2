//! Wire models for the access platform's grant endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatesync_core::{AccessGrant, GrantId, GroupId, NewGrant};

/// One grant as returned by the listing endpoint.
///
/// The listing carries more fields than the reconciliation logic reads
/// (issuer details, usage timestamps, QR settings); anything not modelled
/// here is dropped on decode.
#[derive(Debug, Clone, Deserialize)]
pub struct WireGrant {
    pub id: GrantId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub group_id: GroupId,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

impl From<WireGrant> for AccessGrant {
    fn from(wire: WireGrant) -> Self {
        Self {
            id: wire.id,
            email: wire.email,
            name: wire.name,
            group_id: wire.group_id,
            valid_from: wire.valid_from,
            valid_until: wire.valid_until,
        }
    }
}

/// Envelope the create endpoint expects: the payload nested under
/// `group_link`.
#[derive(Debug, Serialize)]
pub struct GrantCreateEnvelope {
    pub group_link: WireNewGrant,
}

/// Create payload for a grant. Absent window endpoints serialize as `null`,
/// which the platform reads as an open-ended grant.
#[derive(Debug, Serialize)]
pub struct WireNewGrant {
    pub email: String,
    pub name: String,
    pub group_id: GroupId,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl From<NewGrant> for GrantCreateEnvelope {
    fn from(grant: NewGrant) -> Self {
        Self {
            group_link: WireNewGrant {
                email: grant.email,
                name: grant.name,
                group_id: grant.group_id,
                valid_from: grant.valid_from,
                valid_until: grant.valid_until,
            },
        }
    }
}
