//! Authoritative current-step index port.
//!
//! The records API tracks a zero-based current-step index per treatment,
//! outside of the cycle records, behind a protocol-specific endpoint.

use crate::domain::foundation::{DomainError, Protocol, TreatmentId};
use async_trait::async_trait;

#[async_trait]
pub trait StepIndexReader: Send + Sync {
    /// Zero-based current-step index, or `None` if the server has none.
    ///
    /// Callers treat an error the same as `None`; the index is advisory.
    async fn current_step_index(
        &self,
        treatment_id: &TreatmentId,
        protocol: Protocol,
    ) -> Result<Option<i64>, DomainError>;
}
