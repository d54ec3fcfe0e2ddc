//! Record identifiers.
//!
//! The records API keys every entity by UUID. Each kind gets its own
//! newtype so a patient id cannot be handed to a cycle lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

record_id!(
    /// A patient's enrollment in one protocol.
    TreatmentId
);
record_id!(
    /// One attempt within a treatment.
    CycleId
);
record_id!(PatientId);
record_id!(AgreementId);
record_id!(SampleId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_path_segment() {
        let raw = "550e8400-e29b-41d4-a716-446655440000";
        let id: CycleId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
        assert_eq!(format!("/cycles/{}/start", id), format!("/cycles/{}/start", raw));
    }

    #[test]
    fn malformed_id_is_rejected() {
        assert!("cycle-7".parse::<CycleId>().is_err());
        assert!("".parse::<TreatmentId>().is_err());
    }

    #[test]
    fn wraps_existing_uuid() {
        let uuid = Uuid::new_v4();
        let id = TreatmentId::from(uuid);
        assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!(uuid.to_string()));
    }

    #[test]
    fn fresh_ids_differ() {
        assert_ne!(SampleId::new(), SampleId::new());
    }
}
