//! Cycle command handlers.
//!
//! Lifecycle transitions (start, complete, cancel) and step advancement.
//! Each command re-reads the records it decides on.

mod errors;
mod scope;

// Command handlers
mod advance_step;
mod cancel_cycle;
mod complete_cycle;
mod start_cycle;

pub use advance_step::{
    AdvanceStepCommand, AdvanceStepError, AdvanceStepHandler, AdvanceStepResult,
};
pub use cancel_cycle::{
    CancelCycleCommand, CancelCycleError, CancelCycleHandler, CancelCycleResult,
};
pub use complete_cycle::{
    CompleteCycleCommand, CompleteCycleError, CompleteCycleHandler, CompleteCycleResult,
    NextCycleOutcome,
};
pub use start_cycle::{StartCycleCommand, StartCycleError, StartCycleHandler, StartCycleResult};
