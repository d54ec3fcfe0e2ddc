//! REST adapter - clinic records API over HTTP.
//!
//! One client implements every port; the DTOs absorb the API's field aliases
//! so the domain types stay clean.

mod client;
mod dto;

pub use client::{step_index_path, ClinicApiClient};
pub use dto::{AgreementDto, CycleDto, Page, SampleDto, StepIndexDto, TreatmentDto};
