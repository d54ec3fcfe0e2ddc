//! Lab sample reader port, consulted by milestone completion checks.

use crate::domain::foundation::{DomainError, PatientId};
use crate::domain::records::{LabSample, SampleType};
use async_trait::async_trait;

#[async_trait]
pub trait SampleReader: Send + Sync {
    /// Samples of one type collected for a patient.
    async fn list(
        &self,
        sample_type: SampleType,
        patient_id: &PatientId,
    ) -> Result<Vec<LabSample>, DomainError>;
}
