//! TreatmentCycle - one attempt within a treatment.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CycleId, CycleStatus, PatientId, Timestamp, TreatmentId};
use crate::domain::status::{normalize_status, RawStatus};

/// A cycle record as held by the records API.
///
/// Several fields are partially redundant signals for "which step is this
/// cycle": `step_type` (categorical code), `cycle_name` (free text) and the
/// legacy `current_step` / `completed_steps` ids. None of them is trusted on
/// its own; see `domain::workflow` for how they are reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentCycle {
    pub id: CycleId,
    pub treatment_id: TreatmentId,
    pub patient_id: Option<PatientId>,
    /// Attempt order, unique within a treatment.
    pub cycle_number: u32,
    pub cycle_name: Option<String>,
    pub step_type: Option<String>,
    /// Legacy field: canonical step id the cycle is on.
    pub current_step: Option<String>,
    /// Legacy field: canonical step ids already done.
    #[serde(default)]
    pub completed_steps: Vec<String>,
    #[serde(default)]
    pub status: RawStatus,
    /// Explicit ordering override; takes precedence over `cycle_number`
    /// when looking for the next cycle to run.
    pub order_index: Option<i32>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub outcome: Option<String>,
    /// Optimistic concurrency token, when the server provides one.
    pub version: Option<u64>,
}

impl TreatmentCycle {
    /// Creates a planned cycle with no step signals.
    pub fn new(treatment_id: TreatmentId, cycle_number: u32) -> Self {
        Self {
            id: CycleId::new(),
            treatment_id,
            patient_id: None,
            cycle_number,
            cycle_name: None,
            step_type: None,
            current_step: None,
            completed_steps: Vec::new(),
            status: RawStatus::from(CycleStatus::Planned),
            order_index: None,
            start_date: None,
            end_date: None,
            cost: None,
            notes: None,
            outcome: None,
            version: None,
        }
    }

    pub fn with_patient(mut self, patient_id: PatientId) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.cycle_name = Some(name.into());
        self
    }

    pub fn with_step_type(mut self, code: impl Into<String>) -> Self {
        self.step_type = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<RawStatus>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_order_index(mut self, order_index: i32) -> Self {
        self.order_index = Some(order_index);
        self
    }

    pub fn with_current_step(mut self, step_id: impl Into<String>) -> Self {
        self.current_step = Some(step_id.into());
        self
    }

    pub fn with_completed_steps<I, S>(mut self, step_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.completed_steps = step_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// The cycle's status mapped onto the canonical enum.
    pub fn normalized_status(&self) -> CycleStatus {
        normalize_status(&self.status)
    }

    /// Key used to order cycles for progression: `order_index` when set,
    /// then `cycle_number`, then id for a total order.
    pub fn progression_key(&self) -> (i64, u32, CycleId) {
        let primary = self
            .order_index
            .map(i64::from)
            .unwrap_or_else(|| i64::from(self.cycle_number));
        (primary, self.cycle_number, self.id)
    }
}
