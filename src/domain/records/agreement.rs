//! Agreement - consent record tied to a treatment.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AgreementId, TreatmentId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: AgreementId,
    pub treatment_id: TreatmentId,
    pub signed_by_doctor: bool,
    pub signed_by_patient: bool,
}

impl Agreement {
    pub fn new(treatment_id: TreatmentId, signed_by_doctor: bool, signed_by_patient: bool) -> Self {
        Self {
            id: AgreementId::new(),
            treatment_id,
            signed_by_doctor,
            signed_by_patient,
        }
    }

    /// Both parties have signed.
    pub fn is_fully_signed(&self) -> bool {
        self.signed_by_doctor && self.signed_by_patient
    }
}
