//! In-memory clinic records store.
//!
//! Behaves like the records API: versions are bumped on every mutation,
//! stale `expected_version`s are rejected and status changes follow the
//! cycle state machine. Faults can be injected to exercise degraded reads
//! and failed writes.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::domain::foundation::{
    CycleId, CycleStatus, DomainError, ErrorCode, PatientId, Protocol, StateMachine, TreatmentId,
};
use crate::domain::records::{Agreement, LabSample, SampleType, Treatment, TreatmentCycle};
use crate::domain::status::RawStatus;
use crate::ports::{
    AgreementReader, CancelCycleRequest, CompleteCycleRequest, CycleReader, CycleRepository,
    SampleReader, StartCycleRequest, StepIndexReader, TreatmentReader,
};

/// Operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    ListCycles,
    StepIndex,
    Agreements,
    Samples,
    Start,
    Complete,
    Cancel,
    Update,
}

/// One successful cycle write, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleWrite {
    pub cycle_id: CycleId,
    pub operation: &'static str,
}

#[derive(Default)]
struct State {
    treatments: HashMap<TreatmentId, Treatment>,
    cycles: HashMap<CycleId, TreatmentCycle>,
    step_indices: HashMap<TreatmentId, i64>,
    agreements: HashMap<TreatmentId, Agreement>,
    samples: Vec<LabSample>,
    faults: HashSet<Fault>,
    writes: Vec<CycleWrite>,
}

/// Thread-safe in-memory implementation of every port.
#[derive(Default)]
pub struct InMemoryClinicStore {
    state: RwLock<State>,
}

impl InMemoryClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Seeding ===

    pub async fn insert_treatment(&self, treatment: Treatment) {
        let mut state = self.state.write().await;
        state.treatments.insert(treatment.id, treatment);
    }

    /// Stores a cycle as-is; a missing version starts at 1.
    pub async fn insert_cycle(&self, mut cycle: TreatmentCycle) {
        cycle.version.get_or_insert(1);
        let mut state = self.state.write().await;
        state.cycles.insert(cycle.id, cycle);
    }

    pub async fn set_step_index(&self, treatment_id: TreatmentId, index: i64) {
        let mut state = self.state.write().await;
        state.step_indices.insert(treatment_id, index);
    }

    pub async fn insert_agreement(&self, agreement: Agreement) {
        let mut state = self.state.write().await;
        state.agreements.insert(agreement.treatment_id, agreement);
    }

    pub async fn insert_sample(&self, sample: LabSample) {
        let mut state = self.state.write().await;
        state.samples.push(sample);
    }

    // === Fault injection ===

    pub async fn fail(&self, fault: Fault) {
        self.state.write().await.faults.insert(fault);
    }

    pub async fn heal(&self, fault: Fault) {
        self.state.write().await.faults.remove(&fault);
    }

    // === Inspection ===

    pub async fn cycle(&self, id: &CycleId) -> Option<TreatmentCycle> {
        self.state.read().await.cycles.get(id).cloned()
    }

    /// Successful cycle writes in the order they happened.
    pub async fn writes(&self) -> Vec<CycleWrite> {
        self.state.read().await.writes.clone()
    }

    /// Distinct cycles touched by successful writes.
    pub async fn written_cycle_ids(&self) -> HashSet<CycleId> {
        self.writes().await.into_iter().map(|w| w.cycle_id).collect()
    }
}

fn injected(fault: Fault) -> DomainError {
    DomainError::new(
        ErrorCode::RemoteUnavailable,
        format!("Injected failure: {:?}", fault),
    )
}

fn check_fault(state: &State, fault: Fault) -> Result<(), DomainError> {
    if state.faults.contains(&fault) {
        Err(injected(fault))
    } else {
        Ok(())
    }
}

impl State {
    /// Looks up a cycle for mutation, checking the expected version.
    fn cycle_for_write(
        &mut self,
        id: &CycleId,
        expected_version: Option<u64>,
    ) -> Result<&mut TreatmentCycle, DomainError> {
        let cycle = self.cycles.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::CycleNotFound, format!("Cycle not found: {}", id))
                .with_detail("cycle_id", id.to_string())
        })?;

        if let Some(expected) = expected_version {
            if cycle.version != Some(expected) {
                return Err(DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!(
                        "Cycle {} is at version {:?}, expected {}",
                        id, cycle.version, expected
                    ),
                ));
            }
        }
        Ok(cycle)
    }

    fn record(&mut self, cycle_id: CycleId, operation: &'static str) {
        self.writes.push(CycleWrite {
            cycle_id,
            operation,
        });
    }
}

fn transition(cycle: &mut TreatmentCycle, target: CycleStatus) -> Result<(), DomainError> {
    let next = cycle
        .normalized_status()
        .transition_to(target)
        .map_err(|e| e.with_detail("cycle_id", cycle.id.to_string()))?;
    cycle.status = RawStatus::from(next);
    Ok(())
}

fn bump(cycle: &mut TreatmentCycle) {
    cycle.version = Some(cycle.version.unwrap_or(0) + 1);
}

#[async_trait]
impl TreatmentReader for InMemoryClinicStore {
    async fn get_by_id(&self, id: &TreatmentId) -> Result<Option<Treatment>, DomainError> {
        Ok(self.state.read().await.treatments.get(id).cloned())
    }
}

#[async_trait]
impl CycleReader for InMemoryClinicStore {
    async fn list_by_treatment(
        &self,
        treatment_id: &TreatmentId,
    ) -> Result<Vec<TreatmentCycle>, DomainError> {
        let state = self.state.read().await;
        check_fault(&state, Fault::ListCycles)?;
        let mut cycles: Vec<_> = state
            .cycles
            .values()
            .filter(|c| c.treatment_id == *treatment_id)
            .cloned()
            .collect();
        cycles.sort_by_key(|c| c.cycle_number);
        Ok(cycles)
    }

    async fn get_by_id(&self, id: &CycleId) -> Result<Option<TreatmentCycle>, DomainError> {
        Ok(self.state.read().await.cycles.get(id).cloned())
    }
}

#[async_trait]
impl StepIndexReader for InMemoryClinicStore {
    async fn current_step_index(
        &self,
        treatment_id: &TreatmentId,
        _protocol: Protocol,
    ) -> Result<Option<i64>, DomainError> {
        let state = self.state.read().await;
        check_fault(&state, Fault::StepIndex)?;
        Ok(state.step_indices.get(treatment_id).copied())
    }
}

#[async_trait]
impl AgreementReader for InMemoryClinicStore {
    async fn latest_for_treatment(
        &self,
        treatment_id: &TreatmentId,
    ) -> Result<Option<Agreement>, DomainError> {
        let state = self.state.read().await;
        check_fault(&state, Fault::Agreements)?;
        Ok(state.agreements.get(treatment_id).cloned())
    }
}

#[async_trait]
impl SampleReader for InMemoryClinicStore {
    async fn list(
        &self,
        sample_type: SampleType,
        patient_id: &PatientId,
    ) -> Result<Vec<LabSample>, DomainError> {
        let state = self.state.read().await;
        check_fault(&state, Fault::Samples)?;
        Ok(state
            .samples
            .iter()
            .filter(|s| s.sample_type == sample_type && s.patient_id == *patient_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CycleRepository for InMemoryClinicStore {
    async fn update(&self, cycle: &TreatmentCycle) -> Result<TreatmentCycle, DomainError> {
        let mut state = self.state.write().await;
        check_fault(&state, Fault::Update)?;
        let stored = state.cycle_for_write(&cycle.id, cycle.version)?;
        let version = stored.version;
        *stored = cycle.clone();
        stored.version = version;
        bump(stored);
        let updated = stored.clone();
        state.record(cycle.id, "update");
        Ok(updated)
    }

    async fn start(
        &self,
        id: &CycleId,
        request: StartCycleRequest,
    ) -> Result<TreatmentCycle, DomainError> {
        let mut state = self.state.write().await;
        check_fault(&state, Fault::Start)?;
        let cycle = state.cycle_for_write(id, request.expected_version)?;
        transition(cycle, CycleStatus::InProgress)?;
        cycle.start_date = Some(request.start_date);
        bump(cycle);
        let started = cycle.clone();
        state.record(*id, "start");
        Ok(started)
    }

    async fn complete(
        &self,
        id: &CycleId,
        request: CompleteCycleRequest,
    ) -> Result<TreatmentCycle, DomainError> {
        let mut state = self.state.write().await;
        check_fault(&state, Fault::Complete)?;
        let cycle = state.cycle_for_write(id, request.expected_version)?;
        transition(cycle, CycleStatus::Completed)?;
        cycle.end_date = Some(request.end_date);
        if request.outcome.is_some() {
            cycle.outcome = request.outcome;
        }
        if request.notes.is_some() {
            cycle.notes = request.notes;
        }
        bump(cycle);
        let completed = cycle.clone();
        state.record(*id, "complete");
        Ok(completed)
    }

    async fn cancel(
        &self,
        id: &CycleId,
        request: CancelCycleRequest,
    ) -> Result<TreatmentCycle, DomainError> {
        let mut state = self.state.write().await;
        check_fault(&state, Fault::Cancel)?;
        let cycle = state.cycle_for_write(id, request.expected_version)?;
        transition(cycle, CycleStatus::Cancelled)?;
        cycle.notes = Some(match request.notes {
            Some(notes) => format!("Cancelled: {}\n{}", request.reason, notes),
            None => format!("Cancelled: {}", request.reason),
        });
        bump(cycle);
        let cancelled = cycle.clone();
        state.record(*id, "cancel");
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, TreatmentType};

    fn start_request(expected_version: Option<u64>) -> StartCycleRequest {
        StartCycleRequest {
            start_date: Timestamp::now(),
            expected_version,
        }
    }

    async fn store_with_cycle() -> (InMemoryClinicStore, TreatmentCycle) {
        let store = InMemoryClinicStore::new();
        let treatment = Treatment::new(PatientId::new(), TreatmentType::Ivf);
        let cycle = TreatmentCycle::new(treatment.id, 1);
        store.insert_treatment(treatment).await;
        store.insert_cycle(cycle.clone()).await;
        let stored = store.cycle(&cycle.id).await.unwrap();
        (store, stored)
    }

    // ───────────────────────────────────────────────────────────────
    // Versioning
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn inserted_cycles_start_at_version_one() {
        let (_, cycle) = store_with_cycle().await;
        assert_eq!(cycle.version, Some(1));
    }

    #[tokio::test]
    async fn start_bumps_version() {
        let (store, cycle) = store_with_cycle().await;
        let started = store.start(&cycle.id, start_request(Some(1))).await.unwrap();
        assert_eq!(started.version, Some(2));
        assert_eq!(started.normalized_status(), CycleStatus::InProgress);
        assert!(started.start_date.is_some());
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let (store, cycle) = store_with_cycle().await;
        store.start(&cycle.id, start_request(Some(1))).await.unwrap();

        let err = store
            .cancel(
                &cycle.id,
                CancelCycleRequest {
                    reason: "late".to_string(),
                    notes: None,
                    expected_version: Some(1),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrentModification);
    }

    #[tokio::test]
    async fn update_keeps_stored_version_lineage() {
        let (store, cycle) = store_with_cycle().await;
        let edited = cycle.clone().with_current_step("step2_stimulation");
        let updated = store.update(&edited).await.unwrap();
        assert_eq!(updated.version, Some(2));
        assert_eq!(updated.current_step.as_deref(), Some("step2_stimulation"));
    }

    // ───────────────────────────────────────────────────────────────
    // Transitions
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn completing_a_planned_cycle_is_invalid() {
        let (store, cycle) = store_with_cycle().await;
        let err = store
            .complete(
                &cycle.id,
                CompleteCycleRequest {
                    end_date: Timestamp::now(),
                    outcome: None,
                    notes: None,
                    expected_version: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[tokio::test]
    async fn cancel_records_reason_in_notes() {
        let (store, cycle) = store_with_cycle().await;
        let cancelled = store
            .cancel(
                &cycle.id,
                CancelCycleRequest {
                    reason: "patient request".to_string(),
                    notes: Some("call back in spring".to_string()),
                    expected_version: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(cancelled.normalized_status(), CycleStatus::Cancelled);
        let notes = cancelled.notes.unwrap();
        assert!(notes.contains("patient request"));
        assert!(notes.contains("call back in spring"));
    }

    #[tokio::test]
    async fn unknown_cycle_is_not_found() {
        let store = InMemoryClinicStore::new();
        let err = store
            .start(&CycleId::new(), start_request(None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CycleNotFound);
    }

    // ───────────────────────────────────────────────────────────────
    // Faults and inspection
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn injected_fault_fails_until_healed() {
        let (store, cycle) = store_with_cycle().await;
        store.fail(Fault::ListCycles).await;
        let err = store.list_by_treatment(&cycle.treatment_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RemoteUnavailable);

        store.heal(Fault::ListCycles).await;
        assert_eq!(store.list_by_treatment(&cycle.treatment_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_writes_are_not_recorded() {
        let (store, cycle) = store_with_cycle().await;
        store.fail(Fault::Start).await;
        assert!(store.start(&cycle.id, start_request(None)).await.is_err());
        assert!(store.writes().await.is_empty());
    }

    #[tokio::test]
    async fn samples_filter_by_type_and_patient() {
        let store = InMemoryClinicStore::new();
        let patient = PatientId::new();
        store
            .insert_sample(LabSample::new(patient, SampleType::Sperm, true))
            .await;
        store
            .insert_sample(LabSample::new(patient, SampleType::Oocyte, false))
            .await;
        store
            .insert_sample(LabSample::new(PatientId::new(), SampleType::Sperm, true))
            .await;

        let sperm = store.list(SampleType::Sperm, &patient).await.unwrap();
        assert_eq!(sperm.len(), 1);
    }
}
