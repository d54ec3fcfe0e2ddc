//! Domain layer containing the workflow derivation logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, statuses, errors)
//! - `catalog` - Versioned step sequences per protocol
//! - `status` - Normalization of raw cycle statuses
//! - `records` - Treatments, cycles, agreements and samples as read from the clinic API
//! - `workflow` - Step resolution, active cycle selection and progression gates

pub mod catalog;
pub mod foundation;
pub mod records;
pub mod status;
pub mod workflow;
