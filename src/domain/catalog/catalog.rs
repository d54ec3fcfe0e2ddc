//! StepCatalog - the ordered, versioned step sequence of each protocol.
//!
//! Step ids are stable across catalog versions: adding or removing a step in a
//! new version changes ordinals but never the id a step is persisted under.
//! All lookups go through ids or kinds; [`StepCatalog::at_index`] is the one
//! place a positional index is turned into a step.
//!
//! # Step order
//!
//! IVF (v2): stimulation → monitoring → trigger → OPU → fertilization →
//! embryo culture → embryo transfer → pregnancy test
//!
//! IUI (v2): consultation → stimulation → monitoring → trigger → IUI →
//! post-IUI support → pregnancy test

use serde::{Deserialize, Serialize};

use super::{CanonicalStep, StepKind};
use crate::domain::foundation::Protocol;

/// Version of a protocol's step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogVersion {
    /// Legacy sequence: IVF 6 steps, IUI 4 steps.
    V1,
    /// Current sequence: IVF 8 steps, IUI 7 steps.
    #[default]
    V2,
}

impl CatalogVersion {
    pub const LATEST: CatalogVersion = CatalogVersion::V2;

    /// Maps the `protocolVersion` number stored on a treatment.
    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(CatalogVersion::V1),
            2 => Some(CatalogVersion::V2),
            _ => None,
        }
    }
}

const IVF_V1: &[StepKind] = &[
    StepKind::Stimulation,
    StepKind::Monitoring,
    StepKind::OocyteRetrieval,
    StepKind::Fertilization,
    StepKind::EmbryoTransfer,
    StepKind::PregnancyTest,
];

const IVF_V2: &[StepKind] = &[
    StepKind::Stimulation,
    StepKind::Monitoring,
    StepKind::Trigger,
    StepKind::OocyteRetrieval,
    StepKind::Fertilization,
    StepKind::EmbryoCulture,
    StepKind::EmbryoTransfer,
    StepKind::PregnancyTest,
];

const IUI_V1: &[StepKind] = &[
    StepKind::Stimulation,
    StepKind::Insemination,
    StepKind::PostInsemination,
    StepKind::PregnancyTest,
];

const IUI_V2: &[StepKind] = &[
    StepKind::Consultation,
    StepKind::Stimulation,
    StepKind::Monitoring,
    StepKind::Trigger,
    StepKind::Insemination,
    StepKind::PostInsemination,
    StepKind::PregnancyTest,
];

/// Persisted id and display label of a kind within a protocol.
fn definition(protocol: Protocol, kind: StepKind) -> Option<(&'static str, &'static str)> {
    use StepKind::*;
    match (protocol, kind) {
        (Protocol::Ivf, Stimulation) => Some(("step1_stimulation", "Ovarian Stimulation")),
        (Protocol::Ivf, Monitoring) => Some(("step2_monitoring", "Follicle Monitoring")),
        (Protocol::Ivf, Trigger) => Some(("step3_trigger", "Trigger Injection")),
        (Protocol::Ivf, OocyteRetrieval) => Some(("step4_opu", "Oocyte Retrieval (OPU)")),
        (Protocol::Ivf, Fertilization) => Some(("step5_fertilization", "Fertilization")),
        (Protocol::Ivf, EmbryoCulture) => Some(("step6_embryo_culture", "Embryo Culture")),
        (Protocol::Ivf, EmbryoTransfer) => Some(("step7_embryo_transfer", "Embryo Transfer")),
        (Protocol::Ivf, PregnancyTest) => Some(("step8_pregnancy_test", "Pregnancy Test")),

        (Protocol::Iui, Consultation) => Some(("step1_consultation", "Initial Consultation")),
        (Protocol::Iui, Stimulation) => Some(("step2_stimulation", "Ovarian Stimulation")),
        (Protocol::Iui, Monitoring) => Some(("step3_monitoring", "Follicle Monitoring")),
        (Protocol::Iui, Trigger) => Some(("step4_trigger", "Trigger Injection")),
        (Protocol::Iui, Insemination) => Some(("step5_iui", "Intrauterine Insemination")),
        (Protocol::Iui, PostInsemination) => Some(("step6_post_iui", "Post-IUI Luteal Support")),
        (Protocol::Iui, PregnancyTest) => Some(("step7_pregnancy_test", "Pregnancy Test")),

        _ => None,
    }
}

/// The ordered step sequence for one protocol at one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepCatalog {
    protocol: Protocol,
    version: CatalogVersion,
    kinds: &'static [StepKind],
}

impl StepCatalog {
    /// Returns the catalog for a protocol at a specific version.
    pub fn new(protocol: Protocol, version: CatalogVersion) -> Self {
        let kinds = match (protocol, version) {
            (Protocol::Ivf, CatalogVersion::V1) => IVF_V1,
            (Protocol::Ivf, CatalogVersion::V2) => IVF_V2,
            (Protocol::Iui, CatalogVersion::V1) => IUI_V1,
            (Protocol::Iui, CatalogVersion::V2) => IUI_V2,
        };
        Self {
            protocol,
            version,
            kinds,
        }
    }

    /// Returns the latest catalog for a protocol.
    pub fn latest(protocol: Protocol) -> Self {
        Self::new(protocol, CatalogVersion::LATEST)
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn version(&self) -> CatalogVersion {
        self.version
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// All steps in protocol order.
    pub fn ordered_steps(&self) -> Vec<CanonicalStep> {
        (0..self.kinds.len()).filter_map(|i| self.at_index(i)).collect()
    }

    /// Translates a zero-based index into a step. Out of range yields `None`.
    pub fn at_index(&self, index: usize) -> Option<CanonicalStep> {
        let kind = *self.kinds.get(index)?;
        let (id, label) = definition(self.protocol, kind)?;
        Some(CanonicalStep {
            ordinal: index,
            kind,
            id,
            label,
        })
    }

    /// Looks a step up by kind. `None` if this version does not include it.
    pub fn by_kind(&self, kind: StepKind) -> Option<CanonicalStep> {
        let index = self.kinds.iter().position(|k| *k == kind)?;
        self.at_index(index)
    }

    /// Looks a step up by its persisted id (case-insensitive, trimmed).
    pub fn by_id(&self, id: &str) -> Option<CanonicalStep> {
        let wanted = id.trim();
        if wanted.is_empty() {
            return None;
        }
        self.kinds.iter().enumerate().find_map(|(index, kind)| {
            let (step_id, _) = definition(self.protocol, *kind)?;
            if step_id.eq_ignore_ascii_case(wanted) {
                self.at_index(index)
            } else {
                None
            }
        })
    }

    pub fn first(&self) -> Option<CanonicalStep> {
        self.at_index(0)
    }

    pub fn last(&self) -> Option<CanonicalStep> {
        self.kinds.len().checked_sub(1).and_then(|i| self.at_index(i))
    }

    /// The step immediately following `step`, or `None` at the end.
    pub fn after(&self, step: &CanonicalStep) -> Option<CanonicalStep> {
        let current = self.by_id(step.id)?;
        self.at_index(current.ordinal + 1)
    }

    /// True if `step` is an element of this catalog (same id and position).
    pub fn contains(&self, step: &CanonicalStep) -> bool {
        self.at_index(step.ordinal).as_ref() == Some(step)
    }
}
