//! GetWorkflowStatusHandler - Query handler for a treatment's workflow
//! position.
//!
//! Reads the treatment, its cycles and the authoritative step index
//! concurrently, then resolves the current, completed and next steps.
//! Cycle and index reads are advisory: when they fail the resolution runs on
//! what is left and the result names the degraded reads. A request that a
//! newer request for the same treatment overtakes returns `Superseded`.

use std::sync::Arc;

use crate::config::FeatureFlags;
use crate::domain::foundation::{DomainError, Protocol, TreatmentId};
use crate::domain::records::{Treatment, TreatmentCycle};
use crate::domain::workflow::{ResolutionCache, ResolutionInput, StepResolution};
use crate::ports::{CycleReader, StepIndexReader, TreatmentReader};

use super::generations::{Generation, RequestGenerations};

/// Query for a treatment's workflow status.
#[derive(Debug, Clone)]
pub struct GetWorkflowStatusQuery {
    pub treatment_id: TreatmentId,
    /// Protocol, when the caller already knows it; lets the step index be
    /// read alongside the treatment instead of after it.
    pub protocol: Option<Protocol>,
}

impl GetWorkflowStatusQuery {
    pub fn new(treatment_id: TreatmentId) -> Self {
        Self {
            treatment_id,
            protocol: None,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }
}

/// A read that failed and was treated as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedRead {
    Cycles,
    StepIndex,
}

/// Resolved workflow status of one treatment.
#[derive(Debug, Clone)]
pub struct WorkflowStatus {
    pub treatment: Treatment,
    pub cycles: Vec<TreatmentCycle>,
    pub resolution: StepResolution,
    pub degraded: Vec<DegradedRead>,
}

impl WorkflowStatus {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum WorkflowStatusOutcome {
    Resolved(WorkflowStatus),
    /// A newer request for the same treatment started before this one
    /// finished reading.
    Superseded,
}

impl WorkflowStatusOutcome {
    pub fn resolved(self) -> Option<WorkflowStatus> {
        match self {
            WorkflowStatusOutcome::Resolved(status) => Some(status),
            WorkflowStatusOutcome::Superseded => None,
        }
    }
}

/// Error type for the workflow status query.
#[derive(Debug, Clone)]
pub enum GetWorkflowStatusError {
    /// Treatment not found.
    NotFound(TreatmentId),
    /// Infrastructure error.
    Infrastructure(String),
}

impl std::fmt::Display for GetWorkflowStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetWorkflowStatusError::NotFound(id) => write!(f, "Treatment not found: {}", id),
            GetWorkflowStatusError::Infrastructure(msg) => {
                write!(f, "Infrastructure error: {}", msg)
            }
        }
    }
}

impl std::error::Error for GetWorkflowStatusError {}

impl From<DomainError> for GetWorkflowStatusError {
    fn from(err: DomainError) -> Self {
        GetWorkflowStatusError::Infrastructure(err.to_string())
    }
}

/// Handler for the workflow status query.
pub struct GetWorkflowStatusHandler {
    treatments: Arc<dyn TreatmentReader>,
    cycles: Arc<dyn CycleReader>,
    step_indices: Arc<dyn StepIndexReader>,
    cache: ResolutionCache,
    generations: RequestGenerations,
}

impl GetWorkflowStatusHandler {
    pub fn new(
        treatments: Arc<dyn TreatmentReader>,
        cycles: Arc<dyn CycleReader>,
        step_indices: Arc<dyn StepIndexReader>,
        features: &FeatureFlags,
    ) -> Self {
        Self {
            treatments,
            cycles,
            step_indices,
            cache: ResolutionCache::new(features.resolution_cache_capacity),
            generations: RequestGenerations::new(),
        }
    }

    pub fn from_store<S>(store: Arc<S>, features: &FeatureFlags) -> Self
    where
        S: TreatmentReader + CycleReader + StepIndexReader + 'static,
    {
        Self::new(store.clone(), store.clone(), store, features)
    }

    pub async fn handle(
        &self,
        query: GetWorkflowStatusQuery,
    ) -> Result<WorkflowStatusOutcome, GetWorkflowStatusError> {
        let generation = self.generations.begin(query.treatment_id);
        let outcome = self.resolve_status(query, &generation).await;
        self.generations.finish(&generation);
        outcome
    }

    async fn resolve_status(
        &self,
        query: GetWorkflowStatusQuery,
        generation: &Generation,
    ) -> Result<WorkflowStatusOutcome, GetWorkflowStatusError> {
        let id = query.treatment_id;

        let (treatment, cycles, hinted_index) = futures::join!(
            self.treatments.get_by_id(&id),
            self.cycles.list_by_treatment(&id),
            self.read_index(&id, query.protocol),
        );

        let treatment = treatment?.ok_or(GetWorkflowStatusError::NotFound(id))?;
        let mut degraded = Vec::new();

        let cycles = cycles.unwrap_or_else(|e| {
            tracing::warn!(treatment_id = %id, error = %e, "Cycle list unavailable, resolving without cycles");
            degraded.push(DegradedRead::Cycles);
            Vec::new()
        });

        let resolution = match treatment.catalog() {
            None => {
                tracing::debug!(
                    treatment_id = %id,
                    treatment_type = %treatment.treatment_type,
                    "No step catalog for treatment type"
                );
                StepResolution::empty()
            }
            Some(catalog) => {
                let index = match hinted_index {
                    Some(read) if query.protocol == Some(catalog.protocol()) => read,
                    _ => self.read_index(&id, Some(catalog.protocol())).await.unwrap_or(Ok(None)),
                };
                let authoritative_index = index.unwrap_or_else(|e| {
                    tracing::warn!(treatment_id = %id, error = %e, "Current step index unavailable");
                    degraded.push(DegradedRead::StepIndex);
                    None
                });

                if !self.generations.is_current(generation) {
                    tracing::debug!(treatment_id = %id, generation = generation.value, "Status request superseded");
                    return Ok(WorkflowStatusOutcome::Superseded);
                }

                self.cache.resolve(&ResolutionInput {
                    catalog,
                    cycles: &cycles,
                    authoritative_index,
                })
            }
        };

        if !self.generations.is_current(generation) {
            tracing::debug!(treatment_id = %id, generation = generation.value, "Status request superseded");
            return Ok(WorkflowStatusOutcome::Superseded);
        }

        tracing::debug!(
            treatment_id = %id,
            current_step = resolution.current_step.map(|s| s.id),
            source = ?resolution.source,
            degraded = degraded.len(),
            "Workflow status resolved"
        );

        Ok(WorkflowStatusOutcome::Resolved(WorkflowStatus {
            treatment,
            cycles,
            resolution,
            degraded,
        }))
    }

    /// Reads the step index when the protocol is known; `None` when it is not.
    async fn read_index(
        &self,
        id: &TreatmentId,
        protocol: Option<Protocol>,
    ) -> Option<Result<Option<i64>, DomainError>> {
        match protocol {
            Some(protocol) => Some(self.step_indices.current_step_index(id, protocol).await),
            None => None,
        }
    }
}
