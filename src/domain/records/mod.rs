//! Records module - the externally owned records the engine derives from.
//!
//! Treatments, cycles, agreements and samples are owned by the clinic
//! records API. The engine reads them, derives workflow state, and issues
//! mutations back through the ports; it never persists them itself.

mod agreement;
mod cycle;
mod sample;
mod treatment;

pub use agreement::Agreement;
pub use cycle::TreatmentCycle;
pub use sample::{LabSample, SampleType};
pub use treatment::Treatment;
