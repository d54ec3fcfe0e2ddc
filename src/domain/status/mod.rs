//! Status module - normalization of heterogeneous cycle statuses.

mod normalizer;

pub use normalizer::{normalize_status, RawStatus};
