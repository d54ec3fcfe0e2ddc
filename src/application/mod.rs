//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers re-read records, check workflow gates and issue
//! mutations; the query handler resolves a treatment's workflow position.

pub mod handlers;

pub use handlers::{
    // Cycle commands
    AdvanceStepCommand, AdvanceStepError, AdvanceStepHandler, AdvanceStepResult,
    CancelCycleCommand, CancelCycleError, CancelCycleHandler, CancelCycleResult,
    CompleteCycleCommand, CompleteCycleError, CompleteCycleHandler, CompleteCycleResult,
    NextCycleOutcome, StartCycleCommand, StartCycleError, StartCycleHandler, StartCycleResult,
    // Workflow queries
    DegradedRead, GetWorkflowStatusError, GetWorkflowStatusHandler, GetWorkflowStatusQuery,
    RequestGenerations, WorkflowStatus, WorkflowStatusOutcome,
};
