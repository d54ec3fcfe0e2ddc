//! Loading and checks shared by the cycle command handlers.
//!
//! Every command re-reads the cycle, its treatment and the sibling cycles
//! before deciding; nothing is taken from the caller's copy.

use crate::config::FeatureFlags;
use crate::domain::catalog::StepCatalog;
use crate::domain::foundation::{
    CycleId, CycleStatus, DomainError, ErrorCode, PatientId, StateMachine, Timestamp,
};
use crate::domain::records::{Treatment, TreatmentCycle};
use crate::domain::workflow::ConsentGate;
use crate::ports::{AgreementReader, CycleReader, CycleRepository, StartCycleRequest, TreatmentReader};

/// A freshly read cycle together with its treatment and siblings.
#[derive(Debug, Clone)]
pub(crate) struct CycleScope {
    pub treatment: Treatment,
    /// Every cycle of the treatment, including `cycle`.
    pub cycles: Vec<TreatmentCycle>,
    pub cycle: TreatmentCycle,
}

impl CycleScope {
    pub fn catalog(&self) -> Option<StepCatalog> {
        self.treatment.catalog()
    }

    /// Patient the cycle's samples are filed under.
    pub fn patient_id(&self) -> PatientId {
        self.cycle.patient_id.unwrap_or(self.treatment.patient_id)
    }

    /// Replaces the stored copy of a cycle after a write.
    pub fn apply(&mut self, updated: &TreatmentCycle) {
        if let Some(slot) = self.cycles.iter_mut().find(|c| c.id == updated.id) {
            *slot = updated.clone();
        }
        if self.cycle.id == updated.id {
            self.cycle = updated.clone();
        }
    }
}

pub(crate) async fn load_scope(
    treatments: &dyn TreatmentReader,
    cycles: &dyn CycleReader,
    cycle_id: &CycleId,
) -> Result<CycleScope, DomainError> {
    let cycle = cycles.get_by_id(cycle_id).await?.ok_or_else(|| {
        DomainError::new(
            ErrorCode::CycleNotFound,
            format!("Cycle not found: {}", cycle_id),
        )
        .with_detail("cycle_id", cycle_id.to_string())
    })?;

    let treatment = treatments
        .get_by_id(&cycle.treatment_id)
        .await?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::TreatmentNotFound,
                format!("Treatment not found: {}", cycle.treatment_id),
            )
            .with_detail("treatment_id", cycle.treatment_id.to_string())
        })?;

    let mut siblings = cycles.list_by_treatment(&treatment.id).await?;
    if !siblings.iter().any(|c| c.id == cycle.id) {
        siblings.push(cycle.clone());
    }

    Ok(CycleScope {
        treatment,
        cycles: siblings,
        cycle,
    })
}

/// Fails unless the treatment's agreement is fully signed, for treatment
/// types that need one.
pub(crate) async fn require_consent(
    agreements: &dyn AgreementReader,
    treatment: &Treatment,
    features: &FeatureFlags,
) -> Result<(), DomainError> {
    if !features.enforce_consent_gate || !treatment.treatment_type.requires_consent() {
        return Ok(());
    }
    let agreement = agreements.latest_for_treatment(&treatment.id).await?;
    ConsentGate::check(&treatment.treatment_type, agreement.as_ref())
        .map_err(|e| e.with_detail("treatment_id", treatment.id.to_string()))
}

/// Status precondition for moving `cycle` to `target`.
pub(crate) fn require_transition(
    cycle: &TreatmentCycle,
    target: CycleStatus,
) -> Result<(), DomainError> {
    let status = cycle.normalized_status();
    if status.can_transition_to(&target) {
        return Ok(());
    }
    Err(DomainError::new(
        ErrorCode::InvalidStateTransition,
        format!("Cycle {} is {}, cannot move to {}", cycle.id, status, target),
    )
    .with_detail("cycle_id", cycle.id.to_string())
    .with_detail("status", status.to_string()))
}

/// Start preconditions: startable status and no other cycle in progress.
pub(crate) fn require_startable(
    cycle: &TreatmentCycle,
    siblings: &[TreatmentCycle],
) -> Result<(), DomainError> {
    let status = cycle.normalized_status();
    if !status.is_startable() {
        return Err(DomainError::new(
            ErrorCode::InvalidStateTransition,
            format!(
                "Cycle {} is {}; only Planned or Scheduled cycles can start",
                cycle.id, status
            ),
        )
        .with_detail("cycle_id", cycle.id.to_string())
        .with_detail("status", status.to_string()));
    }

    if let Some(open) = siblings
        .iter()
        .find(|c| c.id != cycle.id && c.normalized_status() == CycleStatus::InProgress)
    {
        return Err(DomainError::precondition(format!(
            "Cycle {} is already in progress for this treatment",
            open.cycle_number
        ))
        .with_detail("in_progress_cycle_id", open.id.to_string()));
    }
    Ok(())
}

/// Issues the start call for a cycle that passed its preconditions.
pub(crate) async fn start_now(
    repository: &dyn CycleRepository,
    cycle: &TreatmentCycle,
) -> Result<TreatmentCycle, DomainError> {
    let started = repository
        .start(
            &cycle.id,
            StartCycleRequest {
                start_date: Timestamp::now(),
                expected_version: cycle.version,
            },
        )
        .await?;
    tracing::info!(
        cycle_id = %started.id,
        treatment_id = %started.treatment_id,
        cycle_number = started.cycle_number,
        "Cycle started"
    );
    Ok(started)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TreatmentId;

    fn cycle(treatment: TreatmentId, number: u32, status: CycleStatus) -> TreatmentCycle {
        TreatmentCycle::new(treatment, number).with_status(status)
    }

    #[test]
    fn planned_cycle_is_startable_when_nothing_runs() {
        let t = TreatmentId::new();
        let first = cycle(t, 1, CycleStatus::Completed);
        let second = cycle(t, 2, CycleStatus::Planned);
        assert!(require_startable(&second, &[first, second.clone()]).is_ok());
    }

    #[test]
    fn second_in_progress_cycle_is_refused() {
        let t = TreatmentId::new();
        let running = cycle(t, 1, CycleStatus::InProgress);
        let next = cycle(t, 2, CycleStatus::Planned);
        let err = require_startable(&next, &[running.clone(), next.clone()]).unwrap_err();
        assert_eq!(err.code, ErrorCode::PreconditionViolation);
        assert_eq!(
            err.details.get("in_progress_cycle_id"),
            Some(&running.id.to_string())
        );
    }

    #[test]
    fn completed_cycle_cannot_start() {
        let t = TreatmentId::new();
        let done = cycle(t, 1, CycleStatus::Completed);
        let err = require_startable(&done, &[done.clone()]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn cancel_transition_follows_state_machine() {
        let t = TreatmentId::new();
        assert!(require_transition(&cycle(t, 1, CycleStatus::Scheduled), CycleStatus::Cancelled).is_ok());
        assert!(require_transition(&cycle(t, 1, CycleStatus::Failed), CycleStatus::Cancelled).is_err());
    }
}
