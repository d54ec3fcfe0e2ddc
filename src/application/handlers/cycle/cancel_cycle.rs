//! CancelCycleHandler - Command handler for cancelling a cycle.
//!
//! Any cycle that has not finished can be cancelled. No signatures are
//! required, so a patient can always withdraw.

use std::sync::Arc;

use super::errors::cycle_command_error;
use super::scope::{load_scope, require_transition};
use crate::domain::foundation::{CommandMetadata, CycleId, CycleStatus, DomainError};
use crate::domain::records::TreatmentCycle;
use crate::ports::{CancelCycleRequest, CycleReader, CycleRepository, TreatmentReader};

/// Command to cancel a cycle.
#[derive(Debug, Clone)]
pub struct CancelCycleCommand {
    pub cycle_id: CycleId,
    /// Why the cycle was cancelled. Required.
    pub reason: String,
    pub notes: Option<String>,
}

/// Result of successfully cancelling a cycle.
#[derive(Debug, Clone)]
pub struct CancelCycleResult {
    pub cycle: TreatmentCycle,
}

cycle_command_error!(
    /// Error type for cancelling a cycle.
    CancelCycleError
);

/// Handler for cancelling cycles.
pub struct CancelCycleHandler {
    treatments: Arc<dyn TreatmentReader>,
    cycles: Arc<dyn CycleReader>,
    repository: Arc<dyn CycleRepository>,
}

impl CancelCycleHandler {
    pub fn new(
        treatments: Arc<dyn TreatmentReader>,
        cycles: Arc<dyn CycleReader>,
        repository: Arc<dyn CycleRepository>,
    ) -> Self {
        Self {
            treatments,
            cycles,
            repository,
        }
    }

    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: TreatmentReader + CycleReader + CycleRepository + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    pub async fn handle(
        &self,
        cmd: CancelCycleCommand,
        metadata: CommandMetadata,
    ) -> Result<CancelCycleResult, CancelCycleError> {
        let reason = cmd.reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("reason", "Cancellation reason is required").into());
        }

        let scope = load_scope(self.treatments.as_ref(), self.cycles.as_ref(), &cmd.cycle_id).await?;
        require_transition(&scope.cycle, CycleStatus::Cancelled)?;

        let cycle = self
            .repository
            .cancel(
                &cmd.cycle_id,
                CancelCycleRequest {
                    reason: reason.to_string(),
                    notes: cmd.notes,
                    expected_version: scope.cycle.version,
                },
            )
            .await?;

        tracing::info!(
            correlation_id = %metadata.correlation_id(),
            actor = %metadata.actor,
            source = metadata.source().unwrap_or("unknown"),
            cycle_id = %cycle.id,
            treatment_id = %cycle.treatment_id,
            reason = %reason,
            "Cycle cancelled"
        );

        Ok(CancelCycleResult { cycle })
    }
}
