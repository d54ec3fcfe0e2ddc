//! Workflow query handlers.

mod generations;
mod get_workflow_status;

pub use generations::{Generation, RequestGenerations};
pub use get_workflow_status::{
    DegradedRead, GetWorkflowStatusError, GetWorkflowStatusHandler, GetWorkflowStatusQuery,
    WorkflowStatus, WorkflowStatusOutcome,
};
