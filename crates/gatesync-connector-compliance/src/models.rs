//! Wire models for the workforce-compliance platform API.
//!
//! The platform speaks camelCase JSON with `ID`-suffixed keys and
//! UTC timestamps that may or may not carry an explicit offset. These
//! types decode exactly what the reconciliation needs; unknown fields are
//! ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use gatesync_core::{
    ComplianceRecord, Contractor, ContractorId, ContractorRef, Induction, InductionId, RecordId,
    Worker, WorkerId,
};

/// Envelope around the worker listing.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkersEnvelope {
    #[serde(default)]
    pub workers: Vec<WireWorker>,
}

/// Envelope around the contractor listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractorsEnvelope {
    #[serde(default)]
    pub contractors: Vec<WireContractor>,
}

/// A worker as returned by the compliance API.
#[derive(Debug, Clone, Deserialize)]
pub struct WireWorker {
    #[serde(rename = "workerID")]
    pub worker_id: i64,
    #[serde(rename = "emailAddress", default)]
    pub email_address: String,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "isCompliant", default)]
    pub is_compliant: bool,
    #[serde(default)]
    pub inductions: Vec<WireInduction>,
    #[serde(rename = "primaryContractor", default)]
    pub primary_contractor: Option<WireContractorRef>,
}

/// An induction record attached to a worker.
#[derive(Debug, Clone, Deserialize)]
pub struct WireInduction {
    #[serde(rename = "inductionID")]
    pub induction_id: i64,
    #[serde(rename = "inductedOnUtc", deserialize_with = "utc_timestamp::deserialize")]
    pub inducted_on_utc: DateTime<Utc>,
    #[serde(rename = "expiresOnUtc", deserialize_with = "utc_timestamp::deserialize")]
    pub expires_on_utc: DateTime<Utc>,
}

/// The primary-contractor reference carried on a worker.
#[derive(Debug, Clone, Deserialize)]
pub struct WireContractorRef {
    #[serde(rename = "contractorID")]
    pub contractor_id: i64,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

/// A contractor as returned by the compliance API.
#[derive(Debug, Clone, Deserialize)]
pub struct WireContractor {
    #[serde(rename = "contractorID")]
    pub contractor_id: i64,
    #[serde(rename = "isCompliant", default)]
    pub is_compliant: bool,
    #[serde(default)]
    pub records: Vec<WireRecord>,
}

/// A contractor compliance record (insurance, certificate and the like).
#[derive(Debug, Clone, Deserialize)]
pub struct WireRecord {
    #[serde(rename = "recordID")]
    pub record_id: i64,
    #[serde(rename = "expiresOnUtc", deserialize_with = "utc_timestamp::deserialize")]
    pub expires_on_utc: DateTime<Utc>,
}

impl From<WireWorker> for Worker {
    fn from(wire: WireWorker) -> Self {
        Worker {
            id: WorkerId::new(wire.worker_id),
            email: wire.email_address,
            first_name: wire.first_name,
            is_compliant: wire.is_compliant,
            inductions: wire.inductions.into_iter().map(Induction::from).collect(),
            primary_contractor: wire.primary_contractor.map(ContractorRef::from),
            contractor: None,
        }
    }
}

impl From<WireInduction> for Induction {
    fn from(wire: WireInduction) -> Self {
        Induction {
            id: InductionId::new(wire.induction_id),
            inducted_on: wire.inducted_on_utc,
            expires_on: wire.expires_on_utc,
        }
    }
}

impl From<WireContractorRef> for ContractorRef {
    fn from(wire: WireContractorRef) -> Self {
        ContractorRef {
            id: ContractorId::new(wire.contractor_id),
            display_name: wire.display_name,
        }
    }
}

impl From<WireContractor> for Contractor {
    fn from(wire: WireContractor) -> Self {
        Contractor {
            id: ContractorId::new(wire.contractor_id),
            is_compliant: wire.is_compliant,
            records: wire
                .records
                .into_iter()
                .map(|record| ComplianceRecord {
                    id: RecordId::new(record.record_id),
                    expires_on: record.expires_on_utc,
                })
                .collect(),
        }
    }
}

/// Timestamps suffixed `Utc` in the API are UTC wall-clock values, but the
/// platform is inconsistent about including the offset. Accept both RFC
/// 3339 and bare `YYYY-MM-DDTHH:MM:SS[.fff]` forms.
mod utc_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(with_offset.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decodes_worker_with_offset_timestamps() {
        let json = r#"{
            "workerID": 101,
            "emailAddress": "amy@example.com",
            "firstName": "Amy",
            "isCompliant": true,
            "inductions": [
                {
                    "inductionID": 1,
                    "inductedOnUtc": "2026-01-10T02:30:00Z",
                    "expiresOnUtc": "2027-01-10T02:30:00Z"
                }
            ],
            "primaryContractor": {
                "contractorID": 7,
                "displayName": "Acme Scaffolding"
            }
        }"#;

        let worker = Worker::from(serde_json::from_str::<WireWorker>(json).unwrap());
        assert_eq!(worker.id, WorkerId::new(101));
        assert_eq!(worker.email, "amy@example.com");
        assert!(worker.is_compliant);
        assert_eq!(worker.inductions.len(), 1);
        assert_eq!(
            worker.inductions[0].inducted_on,
            Utc.with_ymd_and_hms(2026, 1, 10, 2, 30, 0).unwrap()
        );
        let primary = worker.primary_contractor.unwrap();
        assert_eq!(primary.id, ContractorId::new(7));
        assert_eq!(primary.display_name, "Acme Scaffolding");
        assert!(worker.contractor.is_none());
    }

    #[test]
    fn test_decodes_bare_utc_timestamps() {
        let json = r#"{
            "inductionID": 2,
            "inductedOnUtc": "2026-01-10T02:30:00",
            "expiresOnUtc": "2027-01-10T02:30:00.500"
        }"#;

        let induction = Induction::from(serde_json::from_str::<WireInduction>(json).unwrap());
        assert_eq!(
            induction.inducted_on,
            Utc.with_ymd_and_hms(2026, 1, 10, 2, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let json = r#"{"workerID": 5, "emailAddress": "b@example.com"}"#;
        let worker = Worker::from(serde_json::from_str::<WireWorker>(json).unwrap());
        assert!(worker.inductions.is_empty());
        assert!(worker.primary_contractor.is_none());
        assert!(!worker.is_compliant);
    }

    #[test]
    fn test_decodes_contractor_with_records() {
        let json = r#"{
            "contractorID": 7,
            "isCompliant": true,
            "status": "Active",
            "nearExpiringItems": 0,
            "records": [
                {"recordID": 31, "recordType": "Insurance", "expiresOnUtc": "2026-12-01T00:00:00Z"}
            ]
        }"#;

        let contractor = Contractor::from(serde_json::from_str::<WireContractor>(json).unwrap());
        assert_eq!(contractor.id, ContractorId::new(7));
        assert!(contractor.is_compliant);
        assert_eq!(contractor.records.len(), 1);
        assert_eq!(contractor.records[0].id, RecordId::new(31));
    }
}
