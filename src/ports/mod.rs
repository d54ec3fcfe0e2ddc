//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the clinic records API. Adapters implement these ports.
//!
//! ## Read Ports
//!
//! - `TreatmentReader` - Treatment records
//! - `CycleReader` - Cycle listings per treatment
//! - `StepIndexReader` - Authoritative current-step index
//! - `AgreementReader` - Consent agreements
//! - `SampleReader` - Lab samples for milestone checks
//!
//! ## Write Ports
//!
//! - `CycleRepository` - Cycle updates and lifecycle transitions

mod agreement_reader;
mod cycle_reader;
mod cycle_repository;
mod sample_reader;
mod step_index_reader;
mod treatment_reader;

pub use agreement_reader::AgreementReader;
pub use cycle_reader::CycleReader;
pub use cycle_repository::{
    CancelCycleRequest, CompleteCycleRequest, CycleRepository, StartCycleRequest,
};
pub use sample_reader::SampleReader;
pub use step_index_reader::StepIndexReader;
pub use treatment_reader::TreatmentReader;
