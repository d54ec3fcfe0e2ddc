//! Workflow module - derives the current position of a treatment.
//!
//! # Module Organization
//!
//! - `step_rules` - ordered keyword rules for step-type codes and cycle names
//! - `step_resolver` - turns one raw signal into a canonical step
//! - `active_cycle` - picks the cycle that represents progress
//! - `strategies` - the current-step priority chains
//! - `resolution` - the full `{current, completed, next}` procedure
//! - `cache` - content-hash memoisation of resolutions
//! - `gates` - consent and milestone sample preconditions

mod active_cycle;
mod cache;
mod gates;
mod resolution;
mod step_resolver;
mod step_rules;
mod strategies;

pub use active_cycle::{next_cycle, ordered_cycles, select_active};
pub use cache::{content_key, ResolutionCache, DEFAULT_CACHE_CAPACITY};
pub use gates::{ConsentGate, MilestoneRequirement};
pub use resolution::{
    completed_steps, resolve_current_step, CurrentStepResolver, ResolutionInput, StepResolution,
};
pub use step_resolver::{
    classify_cycle_name, classify_step_type, from_cycle_name, from_legacy_id, from_numeric_index,
    from_step_type_code, resolve_cycle_step, StepSignal,
};
pub use strategies::{
    ActiveCycleName, ActiveCycleStepType, AfterHighestCompleted, AuthoritativeIndex, FirstStep,
    LegacyCurrentStepField, LowestUncompleted, ResolutionChain, ResolutionContext,
    ResolutionSource, StepStrategy,
};
