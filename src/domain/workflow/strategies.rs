//! Current-step strategies and the ordered chains that evaluate them.
//!
//! Each strategy looks at one signal and either names a step or passes. A
//! [`ResolutionChain`] tries its strategies in order and the first step
//! named wins. Two chains exist because the fallbacks differ depending on
//! whether an active cycle exists:
//!
//! | with active cycle            | without active cycle        |
//! |------------------------------|-----------------------------|
//! | legacy `currentStep` field   | authoritative numeric index |
//! | step-type code               | step after highest completed|
//! | cycle name                   | first catalog step          |
//! | authoritative numeric index  |                             |
//! | lowest uncompleted step      |                             |
//!
//! Active-cycle signals outrank the numeric index because the index can lag
//! when cycles are created out of band.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::catalog::{CanonicalStep, StepCatalog};
use crate::domain::records::TreatmentCycle;

use super::step_resolver::{from_cycle_name, from_legacy_id, from_numeric_index, from_step_type_code};

/// Which strategy produced the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    ActiveCycleLegacyField,
    ActiveCycleStepType,
    ActiveCycleName,
    AuthoritativeIndex,
    LowestUncompleted,
    AfterHighestCompleted,
    FirstStep,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolutionSource::ActiveCycleLegacyField => "active_cycle_legacy_field",
            ResolutionSource::ActiveCycleStepType => "active_cycle_step_type",
            ResolutionSource::ActiveCycleName => "active_cycle_name",
            ResolutionSource::AuthoritativeIndex => "authoritative_index",
            ResolutionSource::LowestUncompleted => "lowest_uncompleted",
            ResolutionSource::AfterHighestCompleted => "after_highest_completed",
            ResolutionSource::FirstStep => "first_step",
        };
        write!(f, "{}", s)
    }
}

/// Everything a strategy may consult.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    pub catalog: &'a StepCatalog,
    pub active_cycle: Option<&'a TreatmentCycle>,
    pub completed: &'a BTreeSet<CanonicalStep>,
    pub authoritative_index: Option<i64>,
}

/// One tier of the current-step priority order.
pub trait StepStrategy: Send + Sync {
    fn source(&self) -> ResolutionSource;

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<CanonicalStep>;
}

/// The active cycle's legacy `currentStep`, unless that step is already done.
pub struct LegacyCurrentStepField;

impl StepStrategy for LegacyCurrentStepField {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::ActiveCycleLegacyField
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<CanonicalStep> {
        let id = ctx.active_cycle?.current_step.as_deref()?;
        from_legacy_id(id, ctx.catalog).filter(|step| !ctx.completed.contains(step))
    }
}

pub struct ActiveCycleStepType;

impl StepStrategy for ActiveCycleStepType {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::ActiveCycleStepType
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<CanonicalStep> {
        let code = ctx.active_cycle?.step_type.as_deref()?;
        from_step_type_code(code, ctx.catalog)
    }
}

pub struct ActiveCycleName;

impl StepStrategy for ActiveCycleName {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::ActiveCycleName
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<CanonicalStep> {
        let name = ctx.active_cycle?.cycle_name.as_deref()?;
        from_cycle_name(name, ctx.catalog)
    }
}

/// The index reported by the dedicated current-step endpoint.
pub struct AuthoritativeIndex;

impl StepStrategy for AuthoritativeIndex {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::AuthoritativeIndex
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<CanonicalStep> {
        let index = ctx.authoritative_index?;
        let step = from_numeric_index(index, ctx.catalog);
        if step.is_none() {
            tracing::warn!(index, len = ctx.catalog.len(), "Authoritative step index out of range");
        }
        step
    }
}

pub struct LowestUncompleted;

impl StepStrategy for LowestUncompleted {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::LowestUncompleted
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<CanonicalStep> {
        ctx.catalog
            .ordered_steps()
            .into_iter()
            .find(|step| !ctx.completed.contains(step))
    }
}

pub struct AfterHighestCompleted;

impl StepStrategy for AfterHighestCompleted {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::AfterHighestCompleted
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<CanonicalStep> {
        let highest = ctx.completed.iter().next_back()?;
        ctx.catalog.after(highest)
    }
}

/// Only fires when nothing is completed; a fully completed treatment has no
/// current step rather than restarting at the top.
pub struct FirstStep;

impl StepStrategy for FirstStep {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::FirstStep
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Option<CanonicalStep> {
        if ctx.completed.is_empty() {
            ctx.catalog.first()
        } else {
            None
        }
    }
}

/// An ordered list of strategies; the first to name a step wins.
pub struct ResolutionChain {
    strategies: Vec<Box<dyn StepStrategy>>,
}

impl ResolutionChain {
    pub fn new(strategies: Vec<Box<dyn StepStrategy>>) -> Self {
        Self { strategies }
    }

    /// Chain used when the treatment has an active cycle.
    pub fn with_active_cycle() -> Self {
        Self::new(vec![
            Box::new(LegacyCurrentStepField),
            Box::new(ActiveCycleStepType),
            Box::new(ActiveCycleName),
            Box::new(AuthoritativeIndex),
            Box::new(LowestUncompleted),
        ])
    }

    /// Chain used when no cycle is open.
    pub fn without_active_cycle() -> Self {
        Self::new(vec![
            Box::new(AuthoritativeIndex),
            Box::new(AfterHighestCompleted),
            Box::new(FirstStep),
        ])
    }

    /// Sources in evaluation order.
    pub fn sources(&self) -> Vec<ResolutionSource> {
        self.strategies.iter().map(|s| s.source()).collect()
    }

    pub fn evaluate(&self, ctx: &ResolutionContext<'_>) -> Option<(CanonicalStep, ResolutionSource)> {
        self.strategies.iter().find_map(|strategy| {
            let step = strategy.resolve(ctx)?;
            tracing::debug!(step = %step, source = %strategy.source(), "Current step resolved");
            Some((step, strategy.source()))
        })
    }
}
