//! Step catalog module - static, versioned step sequences per protocol.

#[allow(clippy::module_inception)]
mod catalog;
mod step;

pub use catalog::{CatalogVersion, StepCatalog};
pub use step::{CanonicalStep, StepKind};
