//! StartCycleHandler - Command handler for starting a cycle.
//!
//! Starting moves a Planned or Scheduled cycle to InProgress. IUI and IVF
//! treatments need a fully signed agreement first, and only one cycle of a
//! treatment may be in progress at a time.

use std::sync::Arc;

use super::errors::cycle_command_error;
use super::scope::{load_scope, require_consent, require_startable, start_now};
use crate::config::FeatureFlags;
use crate::domain::foundation::{CommandMetadata, CycleId};
use crate::domain::records::TreatmentCycle;
use crate::ports::{AgreementReader, CycleReader, CycleRepository, TreatmentReader};

/// Command to start a cycle.
#[derive(Debug, Clone)]
pub struct StartCycleCommand {
    pub cycle_id: CycleId,
}

/// Result of successfully starting a cycle.
#[derive(Debug, Clone)]
pub struct StartCycleResult {
    /// The cycle as stored after the start.
    pub cycle: TreatmentCycle,
}

cycle_command_error!(
    /// Error type for starting a cycle.
    StartCycleError
);

/// Handler for starting cycles.
pub struct StartCycleHandler {
    treatments: Arc<dyn TreatmentReader>,
    cycles: Arc<dyn CycleReader>,
    agreements: Arc<dyn AgreementReader>,
    repository: Arc<dyn CycleRepository>,
    features: FeatureFlags,
}

impl StartCycleHandler {
    pub fn new(
        treatments: Arc<dyn TreatmentReader>,
        cycles: Arc<dyn CycleReader>,
        agreements: Arc<dyn AgreementReader>,
        repository: Arc<dyn CycleRepository>,
        features: FeatureFlags,
    ) -> Self {
        Self {
            treatments,
            cycles,
            agreements,
            repository,
            features,
        }
    }

    /// Builds the handler over one adapter that implements every port.
    pub fn from_store<S>(store: Arc<S>, features: FeatureFlags) -> Self
    where
        S: TreatmentReader + CycleReader + AgreementReader + CycleRepository + 'static,
    {
        Self::new(store.clone(), store.clone(), store.clone(), store, features)
    }

    pub async fn handle(
        &self,
        cmd: StartCycleCommand,
        metadata: CommandMetadata,
    ) -> Result<StartCycleResult, StartCycleError> {
        // 1. Re-read the cycle with its treatment and siblings
        let scope = load_scope(self.treatments.as_ref(), self.cycles.as_ref(), &cmd.cycle_id).await?;

        // 2. Status and single-active checks
        require_startable(&scope.cycle, &scope.cycles)?;

        // 3. Consent
        require_consent(self.agreements.as_ref(), &scope.treatment, &self.features).await?;

        // 4. Start
        let cycle = start_now(self.repository.as_ref(), &scope.cycle).await?;
        tracing::debug!(
            correlation_id = %metadata.correlation_id(),
            actor = %metadata.actor,
            cycle_id = %cycle.id,
            "Start command handled"
        );

        Ok(StartCycleResult { cycle })
    }
}
