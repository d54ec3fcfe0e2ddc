//! CompleteCycleHandler - Command handler for completing a cycle.
//!
//! Completing moves an InProgress cycle to Completed. Milestone cycles
//! (oocyte retrieval, insemination) also need quality-checked samples on
//! file. Once the cycle is completed the next cycle in progression order is
//! started if it is still Planned or Scheduled; a failure there is reported
//! in the result and does not undo the completion.

use std::sync::Arc;

use super::errors::cycle_command_error;
use super::scope::{
    load_scope, require_consent, require_startable, require_transition, start_now, CycleScope,
};
use crate::config::FeatureFlags;
use crate::domain::foundation::{
    CommandMetadata, CycleId, CycleStatus, DomainError, Timestamp,
};
use crate::domain::records::{LabSample, TreatmentCycle};
use crate::domain::workflow::{next_cycle, MilestoneRequirement};
use crate::ports::{
    AgreementReader, CompleteCycleRequest, CycleReader, CycleRepository, SampleReader,
    TreatmentReader,
};

/// Command to complete a cycle.
#[derive(Debug, Clone)]
pub struct CompleteCycleCommand {
    /// The cycle to complete.
    pub cycle_id: CycleId,
    /// Clinical outcome, e.g. `Preg+`.
    pub outcome: Option<String>,
    pub notes: Option<String>,
}

impl CompleteCycleCommand {
    pub fn new(cycle_id: CycleId) -> Self {
        Self {
            cycle_id,
            outcome: None,
            notes: None,
        }
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// What happened to the cycle after the completed one.
#[derive(Debug, Clone, PartialEq)]
pub enum NextCycleOutcome {
    /// The next cycle was started.
    Started(TreatmentCycle),
    /// The next cycle exists but is not Planned or Scheduled.
    NotEligible {
        cycle_id: CycleId,
        status: CycleStatus,
    },
    /// The completed cycle was the last one.
    NoNextCycle,
    /// Automatic start is switched off.
    Disabled,
    /// Starting the next cycle failed; the completion still stands.
    Failed { cycle_id: CycleId, reason: String },
}

impl NextCycleOutcome {
    pub fn started(&self) -> Option<&TreatmentCycle> {
        match self {
            NextCycleOutcome::Started(cycle) => Some(cycle),
            _ => None,
        }
    }

    /// True when the completion succeeded but the follow-up start did not.
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, NextCycleOutcome::Failed { .. })
    }
}

/// Result of successfully completing a cycle.
#[derive(Debug, Clone)]
pub struct CompleteCycleResult {
    /// The completed cycle.
    pub cycle: TreatmentCycle,
    pub next: NextCycleOutcome,
}

cycle_command_error!(
    /// Error type for completing a cycle.
    CompleteCycleError
);

/// Handler for completing cycles.
pub struct CompleteCycleHandler {
    treatments: Arc<dyn TreatmentReader>,
    cycles: Arc<dyn CycleReader>,
    agreements: Arc<dyn AgreementReader>,
    samples: Arc<dyn SampleReader>,
    repository: Arc<dyn CycleRepository>,
    features: FeatureFlags,
}

impl CompleteCycleHandler {
    pub fn new(
        treatments: Arc<dyn TreatmentReader>,
        cycles: Arc<dyn CycleReader>,
        agreements: Arc<dyn AgreementReader>,
        samples: Arc<dyn SampleReader>,
        repository: Arc<dyn CycleRepository>,
        features: FeatureFlags,
    ) -> Self {
        Self {
            treatments,
            cycles,
            agreements,
            samples,
            repository,
            features,
        }
    }

    /// Builds the handler over one adapter that implements every port.
    pub fn from_store<S>(store: Arc<S>, features: FeatureFlags) -> Self
    where
        S: TreatmentReader
            + CycleReader
            + AgreementReader
            + SampleReader
            + CycleRepository
            + 'static,
    {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            features,
        )
    }

    pub async fn handle(
        &self,
        cmd: CompleteCycleCommand,
        metadata: CommandMetadata,
    ) -> Result<CompleteCycleResult, CompleteCycleError> {
        // 1. Re-read the cycle with its treatment and siblings
        let mut scope =
            load_scope(self.treatments.as_ref(), self.cycles.as_ref(), &cmd.cycle_id).await?;

        // 2. Only an InProgress cycle can complete
        require_transition(&scope.cycle, CycleStatus::Completed)?;

        // 3. Consent and milestone samples
        require_consent(self.agreements.as_ref(), &scope.treatment, &self.features).await?;
        if self.features.enforce_sample_gate {
            self.check_samples(&scope).await?;
        }

        // 4. Complete
        let cycle = self
            .repository
            .complete(
                &cmd.cycle_id,
                CompleteCycleRequest {
                    end_date: Timestamp::now(),
                    outcome: cmd.outcome,
                    notes: cmd.notes,
                    expected_version: scope.cycle.version,
                },
            )
            .await?;
        tracing::info!(
            correlation_id = %metadata.correlation_id(),
            cycle_id = %cycle.id,
            treatment_id = %cycle.treatment_id,
            cycle_number = cycle.cycle_number,
            "Cycle completed"
        );
        scope.apply(&cycle);

        // 5. Follow-up start; never fails the command
        let next = self.start_next(&scope).await;

        Ok(CompleteCycleResult { cycle, next })
    }

    async fn check_samples(&self, scope: &CycleScope) -> Result<(), DomainError> {
        let Some(catalog) = scope.catalog() else {
            return Ok(());
        };
        let Some(milestone) = MilestoneRequirement::for_cycle(&scope.cycle, &catalog) else {
            return Ok(());
        };

        let patient_id = scope.patient_id();
        let mut samples: Vec<LabSample> = Vec::new();
        for sample_type in milestone.required {
            samples.extend(self.samples.list(*sample_type, &patient_id).await?);
        }

        milestone.check(&samples).map_err(|e| {
            tracing::info!(
                cycle_id = %scope.cycle.id,
                milestone = %milestone.kind,
                "Completion blocked by sample quality check"
            );
            e.with_detail("cycle_id", scope.cycle.id.to_string())
        })
    }

    async fn start_next(&self, scope: &CycleScope) -> NextCycleOutcome {
        if !self.features.auto_start_next_cycle {
            return NextCycleOutcome::Disabled;
        }

        let Some(next) = next_cycle(&scope.cycles, &scope.cycle) else {
            return NextCycleOutcome::NoNextCycle;
        };

        let status = next.normalized_status();
        if !status.is_startable() {
            tracing::debug!(cycle_id = %next.id, status = %status, "Next cycle not eligible for start");
            return NextCycleOutcome::NotEligible {
                cycle_id: next.id,
                status,
            };
        }

        let started = match require_startable(next, &scope.cycles) {
            Ok(()) => start_now(self.repository.as_ref(), next).await,
            Err(e) => Err(e),
        };

        match started {
            Ok(cycle) => NextCycleOutcome::Started(cycle),
            Err(e) => {
                tracing::warn!(
                    completed_cycle_id = %scope.cycle.id,
                    next_cycle_id = %next.id,
                    error = %e,
                    "Automatic start of next cycle failed"
                );
                NextCycleOutcome::Failed {
                    cycle_id: next.id,
                    reason: e.to_string(),
                }
            }
        }
    }
}
