//! Adapters - Implementations of port interfaces.
//!
//! - `rest` - Clinic records API over HTTP
//! - `memory` - In-memory store with fault injection

pub mod memory;
pub mod rest;

pub use memory::{Fault, InMemoryClinicStore};
pub use rest::ClinicApiClient;
