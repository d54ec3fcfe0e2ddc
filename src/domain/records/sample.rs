//! LabSample - sperm / oocyte samples and their quality-check state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{PatientId, SampleId, Timestamp};

/// Sample types the lab tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SampleType {
    Sperm,
    Oocyte,
    Embryo,
}

impl SampleType {
    /// Query-string spelling used by the samples endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleType::Sperm => "SPERM",
            SampleType::Oocyte => "OOCYTE",
            SampleType::Embryo => "EMBRYO",
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabSample {
    pub id: SampleId,
    pub patient_id: PatientId,
    pub sample_type: SampleType,
    pub quality_checked: bool,
    pub collected_at: Option<Timestamp>,
}

impl LabSample {
    pub fn new(patient_id: PatientId, sample_type: SampleType, quality_checked: bool) -> Self {
        Self {
            id: SampleId::new(),
            patient_id,
            sample_type,
            quality_checked,
            collected_at: None,
        }
    }
}
