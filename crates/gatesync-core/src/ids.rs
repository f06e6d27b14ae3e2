//! Strongly Typed Identifiers
//!
//! Type-safe identifier types for the records exchanged with the two
//! platforms. Both platforms key their records with numeric identifiers;
//! the newtype pattern prevents accidental misuse of one ID type where
//! another is expected.
//!
//! # Example
//!
//! ```
//! use gatesync_core::{GrantId, WorkerId};
//!
//! let worker = WorkerId::new(42);
//! let grant = GrantId::new(42);
//!
//! // Type safety: cannot pass GrantId where WorkerId is expected
//! fn requires_worker(id: WorkerId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_worker(worker);
//! // requires_worker(grant); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Macro to define a strongly-typed ID type over the platforms' numeric keys.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an ID from the platform's numeric key.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying numeric key.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for workers in the workforce-compliance
    /// platform.
    ///
    /// # Example
    ///
    /// ```
    /// use gatesync_core::WorkerId;
    ///
    /// let worker_id = WorkerId::new(1001);
    /// assert_eq!(worker_id.value(), 1001);
    /// println!("Worker: {}", worker_id);
    /// ```
    WorkerId
);

define_id!(
    /// Strongly typed identifier for induction records.
    InductionId
);

define_id!(
    /// Strongly typed identifier for contractors in the workforce-compliance
    /// platform.
    ContractorId
);

define_id!(
    /// Strongly typed identifier for contractor compliance records.
    RecordId
);

define_id!(
    /// Strongly typed identifier for access grants in the access-control
    /// platform.
    GrantId
);

define_id!(
    /// Strongly typed identifier for the access group that grants are
    /// issued into.
    GroupId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_preserves_value() {
        let id = WorkerId::new(42);
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn test_display_returns_numeric_string() {
        let id = GrantId::new(98765);
        assert_eq!(id.to_string(), "98765");
    }

    #[test]
    fn test_from_i64_roundtrip() {
        let id = ContractorId::from(7);
        assert_eq!(i64::from(id), 7);
    }

    #[test]
    fn test_same_value_is_equal() {
        assert_eq!(InductionId::new(3), InductionId::new(3));
        assert_ne!(InductionId::new(3), InductionId::new(4));
    }

    #[test]
    fn test_can_use_as_hashmap_key() {
        use std::collections::HashMap;

        let mut map: HashMap<ContractorId, String> = HashMap::new();
        map.insert(ContractorId::new(1), "first".to_string());
        map.insert(ContractorId::new(2), "second".to_string());

        assert_eq!(map.get(&ContractorId::new(1)), Some(&"first".to_string()));
        assert_eq!(map.get(&ContractorId::new(2)), Some(&"second".to_string()));
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let id = GroupId::new(512);
        let json = serde_json::to_string(&id).unwrap();
        // Transparent newtype: plain number, not an object.
        assert_eq!(json, "512");

        let back: GroupId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
