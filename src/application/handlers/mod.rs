//! Command and query handlers.
//!
//! - `cycle` - Lifecycle commands and step advancement
//! - `workflow` - Workflow status query

pub mod cycle;
pub mod workflow;

pub use cycle::{
    AdvanceStepCommand, AdvanceStepError, AdvanceStepHandler, AdvanceStepResult,
    CancelCycleCommand, CancelCycleError, CancelCycleHandler, CancelCycleResult,
    CompleteCycleCommand, CompleteCycleError, CompleteCycleHandler, CompleteCycleResult,
    NextCycleOutcome, StartCycleCommand, StartCycleError, StartCycleHandler, StartCycleResult,
};
pub use workflow::{
    DegradedRead, GetWorkflowStatusError, GetWorkflowStatusHandler, GetWorkflowStatusQuery,
    RequestGenerations, WorkflowStatus, WorkflowStatusOutcome,
};
