//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `MemberId` where a
//! `GlAccountId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(MemberId, "Unique identifier for a member.");
typed_id!(ProductTypeId, "Unique identifier for a product type.");
typed_id!(AccountId, "Unique identifier for a member product account.");
typed_id!(TransactionId, "Unique identifier for a domain transaction.");
typed_id!(GlAccountId, "Unique identifier for a general-ledger account.");
typed_id!(
    TemplateId,
    "Unique identifier for a posting template."
);
typed_id!(JournalId, "Unique identifier for a journal header.");
typed_id!(JournalEntryId, "Unique identifier for a journal entry.");
typed_id!(
    GuarantorProfileId,
    "Unique identifier for a guarantor profile."
);
typed_id!(
    LoanApplicationId,
    "Unique identifier for a loan application."
);
typed_id!(
    GuaranteeRequestId,
    "Unique identifier for a guarantee request."
);
typed_id!(MemberFeeId, "Unique identifier for a member fee record.");
typed_id!(BulkLogId, "Unique identifier for a bulk transaction log.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_creation() {
        let id = MemberId::new();
        assert!(!id.to_string().is_empty());
    }

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = MemberId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
    }

    #[test]
    fn test_typed_id_display_roundtrip() {
        let id = GlAccountId::new();
        let parsed = GlAccountId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_typed_id_v7_is_time_ordered() {
        let a = JournalId::new();
        let b = JournalId::new();
        assert!(a.into_inner() <= b.into_inner());
    }
}
