//! In-memory adapter for tests and local runs.

mod store;

pub use store::{CycleWrite, Fault, InMemoryClinicStore};
