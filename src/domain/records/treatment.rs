//! Treatment - a patient's enrollment in a protocol.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogVersion, StepCatalog};
use crate::domain::foundation::{PatientId, Timestamp, TreatmentId, TreatmentType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: TreatmentId,
    pub patient_id: PatientId,
    pub treatment_type: TreatmentType,
    /// Free-form treatment status; only the cycle statuses drive the workflow.
    pub status: Option<String>,
    /// Catalog version the treatment plan was authored against.
    pub protocol_version: Option<u32>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub total_cost: Option<f64>,
}

impl Treatment {
    pub fn new(patient_id: PatientId, treatment_type: TreatmentType) -> Self {
        Self {
            id: TreatmentId::new(),
            patient_id,
            treatment_type,
            status: None,
            protocol_version: None,
            start_date: None,
            end_date: None,
            total_cost: None,
        }
    }

    pub fn with_protocol_version(mut self, version: u32) -> Self {
        self.protocol_version = Some(version);
        self
    }

    /// Catalog version to use; unknown or missing versions fall back to latest.
    ///
    /// An unknown recorded version is logged, since the latest catalog may
    /// number the steps differently from the one the treatment began on.
    pub fn catalog_version(&self) -> CatalogVersion {
        let Some(number) = self.protocol_version else {
            return CatalogVersion::LATEST;
        };
        CatalogVersion::from_number(number).unwrap_or_else(|| {
            tracing::warn!(
                treatment_id = %self.id,
                protocol_version = number,
                "Unknown protocol version, using latest step catalog"
            );
            CatalogVersion::LATEST
        })
    }

    /// The step catalog for this treatment, or `None` for types without one.
    pub fn catalog(&self) -> Option<StepCatalog> {
        self.treatment_type
            .protocol()
            .map(|protocol| StepCatalog::new(protocol, self.catalog_version()))
    }
}
