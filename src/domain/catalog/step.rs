//! Canonical step kinds and step values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every clinical step known to any protocol.
///
/// Which kinds a protocol actually uses, and in what order, is defined by its
/// [`StepCatalog`](super::StepCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Consultation,
    Stimulation,
    Monitoring,
    Trigger,
    OocyteRetrieval,
    Fertilization,
    EmbryoCulture,
    EmbryoTransfer,
    Insemination,
    PostInsemination,
    PregnancyTest,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepKind::Consultation => "consultation",
            StepKind::Stimulation => "stimulation",
            StepKind::Monitoring => "monitoring",
            StepKind::Trigger => "trigger",
            StepKind::OocyteRetrieval => "oocyte_retrieval",
            StepKind::Fertilization => "fertilization",
            StepKind::EmbryoCulture => "embryo_culture",
            StepKind::EmbryoTransfer => "embryo_transfer",
            StepKind::Insemination => "insemination",
            StepKind::PostInsemination => "post_insemination",
            StepKind::PregnancyTest => "pregnancy_test",
        };
        write!(f, "{}", s)
    }
}

/// A step's position within one catalog version.
///
/// Ordering is by ordinal, so a `BTreeSet<CanonicalStep>` iterates in
/// protocol order. Two steps from the same catalog are equal iff their ids are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CanonicalStep {
    /// Zero-based position in the catalog.
    pub ordinal: usize,
    pub kind: StepKind,
    /// Stable token persisted in legacy `currentStep` / `completedSteps` fields.
    pub id: &'static str,
    pub label: &'static str,
}

impl fmt::Display for CanonicalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
