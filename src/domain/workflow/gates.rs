//! Progression preconditions: signed consent and milestone sample checks.
//!
//! Both gates are pure; handlers fetch the agreement and samples and pass
//! them in.

use crate::domain::catalog::{CanonicalStep, StepCatalog, StepKind};
use crate::domain::foundation::{DomainError, ErrorCode, Protocol, TreatmentType};
use crate::domain::records::{Agreement, LabSample, SampleType, TreatmentCycle};

use super::step_resolver::resolve_cycle_step;

// ════════════════════════════════════════════════════════════════════════════════
// Consent
// ════════════════════════════════════════════════════════════════════════════════

/// IUI and IVF treatments may not progress beyond planning until the
/// treatment's agreement is signed by both doctor and patient.
pub struct ConsentGate;

impl ConsentGate {
    pub fn check(
        treatment_type: &TreatmentType,
        agreement: Option<&Agreement>,
    ) -> Result<(), DomainError> {
        if !treatment_type.requires_consent() {
            return Ok(());
        }

        match agreement {
            Some(a) if a.is_fully_signed() => Ok(()),
            Some(a) => Err(DomainError::new(
                ErrorCode::ConsentMissing,
                "Treatment agreement must be signed by both doctor and patient",
            )
            .with_detail("signed_by_doctor", a.signed_by_doctor.to_string())
            .with_detail("signed_by_patient", a.signed_by_patient.to_string())),
            None => Err(DomainError::new(
                ErrorCode::ConsentMissing,
                "No agreement found for treatment",
            )),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Milestone sample checks
// ════════════════════════════════════════════════════════════════════════════════

/// A step whose cycle cannot complete without quality-checked samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneRequirement {
    pub protocol: Protocol,
    pub kind: StepKind,
    pub required: &'static [SampleType],
}

const MILESTONES: &[MilestoneRequirement] = &[
    MilestoneRequirement {
        protocol: Protocol::Ivf,
        kind: StepKind::OocyteRetrieval,
        required: &[SampleType::Sperm, SampleType::Oocyte],
    },
    MilestoneRequirement {
        protocol: Protocol::Iui,
        kind: StepKind::Insemination,
        required: &[SampleType::Sperm],
    },
];

impl MilestoneRequirement {
    /// All milestone definitions.
    pub fn all() -> &'static [MilestoneRequirement] {
        MILESTONES
    }

    /// The milestone, if any, that `cycle` represents.
    ///
    /// Detection tries the cycle's step type, then its name. A cycle with no
    /// recognisable step signal is matched by position: its `cycle_number`
    /// equals the milestone step's one-based position in the catalog.
    pub fn for_cycle(
        cycle: &TreatmentCycle,
        catalog: &StepCatalog,
    ) -> Option<&'static MilestoneRequirement> {
        match resolve_cycle_step(cycle, catalog) {
            Some(step) => Self::for_step(catalog.protocol(), &step),
            None => MILESTONES.iter().find(|m| {
                m.protocol == catalog.protocol()
                    && catalog
                        .by_kind(m.kind)
                        .is_some_and(|step| step.ordinal + 1 == cycle.cycle_number as usize)
            }),
        }
    }

    pub fn for_step(protocol: Protocol, step: &CanonicalStep) -> Option<&'static MilestoneRequirement> {
        MILESTONES
            .iter()
            .find(|m| m.protocol == protocol && m.kind == step.kind)
    }

    /// Checks the patient's samples against this milestone.
    ///
    /// Passes when no sample of any required type exists yet (nothing has
    /// been collected). Otherwise every required type needs at least one
    /// quality-checked sample.
    pub fn check(&self, samples: &[LabSample]) -> Result<(), DomainError> {
        let relevant: Vec<&LabSample> = samples
            .iter()
            .filter(|s| self.required.contains(&s.sample_type))
            .collect();

        if relevant.is_empty() {
            tracing::debug!(milestone = %self.kind, "No samples collected yet, skipping quality check");
            return Ok(());
        }

        let missing: Vec<SampleType> = self
            .required
            .iter()
            .copied()
            .filter(|ty| {
                !relevant
                    .iter()
                    .any(|s| s.sample_type == *ty && s.quality_checked)
            })
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        let names: Vec<&str> = missing.iter().map(SampleType::as_str).collect();
        Err(DomainError::new(
            ErrorCode::SampleQualityCheckMissing,
            format!(
                "Cycle for {} requires quality-checked samples: {}",
                self.kind,
                names.join(", ")
            ),
        )
        .with_detail("missing", names.join(",")))
    }
}
