//! AdvanceStepHandler - moves a treatment's active cycle to the next
//! catalog step.
//!
//! Only the legacy step fields on the active cycle change: the current step
//! joins `completed_steps` and `current_step` becomes the step after it.

use std::sync::Arc;

use super::errors::cycle_command_error;
use super::scope::require_consent;
use crate::config::FeatureFlags;
use crate::domain::catalog::CanonicalStep;
use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, TreatmentId};
use crate::domain::records::TreatmentCycle;
use crate::domain::workflow::{CurrentStepResolver, ResolutionInput};
use crate::ports::{
    AgreementReader, CycleReader, CycleRepository, StepIndexReader, TreatmentReader,
};

/// Command to advance a treatment by one step.
#[derive(Debug, Clone)]
pub struct AdvanceStepCommand {
    pub treatment_id: TreatmentId,
}

/// Result of a successful advance.
#[derive(Debug, Clone)]
pub struct AdvanceStepResult {
    /// The active cycle as stored after the update.
    pub cycle: TreatmentCycle,
    pub previous_step: CanonicalStep,
    pub current_step: CanonicalStep,
}

cycle_command_error!(
    /// Error type for advancing a step.
    AdvanceStepError
);

/// Handler for advancing the workflow step.
pub struct AdvanceStepHandler {
    treatments: Arc<dyn TreatmentReader>,
    cycles: Arc<dyn CycleReader>,
    step_indices: Arc<dyn StepIndexReader>,
    agreements: Arc<dyn AgreementReader>,
    repository: Arc<dyn CycleRepository>,
    resolver: CurrentStepResolver,
    features: FeatureFlags,
}

impl AdvanceStepHandler {
    pub fn new(
        treatments: Arc<dyn TreatmentReader>,
        cycles: Arc<dyn CycleReader>,
        step_indices: Arc<dyn StepIndexReader>,
        agreements: Arc<dyn AgreementReader>,
        repository: Arc<dyn CycleRepository>,
        features: FeatureFlags,
    ) -> Self {
        Self {
            treatments,
            cycles,
            step_indices,
            agreements,
            repository,
            resolver: CurrentStepResolver::default(),
            features,
        }
    }

    pub fn from_store<S>(store: Arc<S>, features: FeatureFlags) -> Self
    where
        S: TreatmentReader
            + CycleReader
            + StepIndexReader
            + AgreementReader
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
        cmd: AdvanceStepCommand,
        metadata: CommandMetadata,
    ) -> Result<AdvanceStepResult, AdvanceStepError> {
        let treatment = self
            .treatments
            .get_by_id(&cmd.treatment_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::TreatmentNotFound,
                    format!("Treatment not found: {}", cmd.treatment_id),
                )
            })?;
        let catalog = treatment.catalog().ok_or_else(|| {
            DomainError::new(
                ErrorCode::UnsupportedProtocol,
                format!(
                    "Treatment type {} has no step catalog",
                    treatment.treatment_type
                ),
            )
        })?;

        require_consent(self.agreements.as_ref(), &treatment, &self.features).await?;

        let cycles = self.cycles.list_by_treatment(&treatment.id).await?;
        let authoritative_index = match self
            .step_indices
            .current_step_index(&treatment.id, catalog.protocol())
            .await
        {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!(treatment_id = %treatment.id, error = %e, "Current step index unavailable");
                None
            }
        };

        let resolution = self.resolver.resolve(&ResolutionInput {
            catalog,
            cycles: &cycles,
            authoritative_index,
        });

        let active = resolution
            .active_cycle_id
            .and_then(|id| cycles.iter().find(|c| c.id == id))
            .ok_or_else(|| DomainError::precondition("Treatment has no active cycle to advance"))?;
        let current = resolution
            .current_step
            .ok_or_else(|| DomainError::precondition("Current step could not be determined"))?;
        let next = resolution.next_step.ok_or_else(|| {
            DomainError::precondition(format!("{} is the last step", current.label))
                .with_detail("step", current.id)
        })?;

        let mut updated = active.clone();
        if !updated.completed_steps.iter().any(|id| id == current.id) {
            updated.completed_steps.push(current.id.to_string());
        }
        updated.current_step = Some(next.id.to_string());

        let cycle = self.repository.update(&updated).await?;
        tracing::info!(
            correlation_id = %metadata.correlation_id(),
            treatment_id = %treatment.id,
            cycle_id = %cycle.id,
            from = current.id,
            to = next.id,
            "Workflow step advanced"
        );

        Ok(AdvanceStepResult {
            cycle,
            previous_step: current,
            current_step: next,
        })
    }
}
