//! Consent agreement reader port.

use crate::domain::foundation::{DomainError, TreatmentId};
use crate::domain::records::Agreement;
use async_trait::async_trait;

#[async_trait]
pub trait AgreementReader: Send + Sync {
    /// The most recent agreement for a treatment, if any.
    async fn latest_for_treatment(
        &self,
        treatment_id: &TreatmentId,
    ) -> Result<Option<Agreement>, DomainError>;
}
