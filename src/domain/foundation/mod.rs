//! Identifiers, statuses, timestamps and the error type every other
//! layer builds on.

mod command;
mod cycle_status;
mod errors;
mod ids;
mod state_machine;
mod timestamp;
mod treatment_type;

pub use command::CommandMetadata;
pub use cycle_status::CycleStatus;
pub use errors::{DomainError, ErrorCode};
pub use ids::{AgreementId, CycleId, PatientId, SampleId, TreatmentId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
pub use treatment_type::{Protocol, TreatmentType};
