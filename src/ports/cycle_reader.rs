//! Cycle reader port (read side).
//!
//! Cycles are owned by the clinic records API; handlers always re-read the
//! full list for a treatment before deciding on a transition.

use crate::domain::foundation::{CycleId, DomainError, TreatmentId};
use crate::domain::records::TreatmentCycle;
use async_trait::async_trait;

#[async_trait]
pub trait CycleReader: Send + Sync {
    /// All cycles of a treatment, in no particular order.
    ///
    /// Implementations page through the remote listing until exhausted.
    async fn list_by_treatment(
        &self,
        treatment_id: &TreatmentId,
    ) -> Result<Vec<TreatmentCycle>, DomainError>;

    /// Get a single cycle by ID.
    ///
    /// Returns `None` if not found.
    async fn get_by_id(&self, id: &CycleId) -> Result<Option<TreatmentCycle>, DomainError>;
}
