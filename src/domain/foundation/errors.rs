//! Workflow error vocabulary.
//!
//! Every failure that crosses a port or leaves a handler is a `DomainError`
//! carrying one `ErrorCode` and free-form string details (cycle ids,
//! offending statuses, missing sample types).

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,

    TreatmentNotFound,
    CycleNotFound,

    InvalidStateTransition,
    PreconditionViolation,
    ConsentMissing,
    SampleQualityCheckMissing,
    UnsupportedProtocol,
    ConcurrentModification,

    RemoteUnavailable,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::TreatmentNotFound => "TREATMENT_NOT_FOUND",
            ErrorCode::CycleNotFound => "CYCLE_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::PreconditionViolation => "PRECONDITION_VIOLATION",
            ErrorCode::ConsentMissing => "CONSENT_MISSING",
            ErrorCode::SampleQualityCheckMissing => "SAMPLE_QUALITY_CHECK_MISSING",
            ErrorCode::UnsupportedProtocol => "UNSUPPORTED_PROTOCOL",
            ErrorCode::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorCode::RemoteUnavailable => "REMOTE_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// The operation was refused because of the workflow's current state,
    /// not because of bad input or a broken backend.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidStateTransition
                | ErrorCode::PreconditionViolation
                | ErrorCode::ConsentMissing
                | ErrorCode::SampleQualityCheckMissing
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Bad input on `field`; the field name lands in the `field` detail.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PreconditionViolation, message)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}
