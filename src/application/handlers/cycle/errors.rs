//! Error enums shared in shape by the cycle command handlers.

/// Declares a cycle command error enum with the standard classification of
/// `DomainError` codes.
macro_rules! cycle_command_error {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub enum $name {
            /// Cycle or treatment does not exist.
            NotFound($crate::domain::foundation::DomainError),
            /// The workflow refused the operation (status, consent, samples).
            Rejected($crate::domain::foundation::DomainError),
            /// The cycle changed since it was read.
            Conflict($crate::domain::foundation::DomainError),
            /// The records store failed.
            Infrastructure($crate::domain::foundation::DomainError),
        }

        impl $name {
            /// The underlying domain error.
            pub fn domain_error(&self) -> &$crate::domain::foundation::DomainError {
                match self {
                    $name::NotFound(e)
                    | $name::Rejected(e)
                    | $name::Conflict(e)
                    | $name::Infrastructure(e) => e,
                }
            }

            pub fn code(&self) -> $crate::domain::foundation::ErrorCode {
                self.domain_error().code
            }

            /// True when the operation was refused by a workflow precondition.
            pub fn is_precondition(&self) -> bool {
                self.code().is_precondition()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $name::NotFound(e) => write!(f, "Not found: {}", e.message),
                    $name::Rejected(e) => write!(f, "Rejected: {}", e.message),
                    $name::Conflict(e) => write!(f, "Conflict: {}", e.message),
                    $name::Infrastructure(e) => write!(f, "Infrastructure error: {}", e.message),
                }
            }
        }

        impl std::error::Error for $name {}

        impl From<$crate::domain::foundation::DomainError> for $name {
            fn from(err: $crate::domain::foundation::DomainError) -> Self {
                use $crate::domain::foundation::ErrorCode;
                match err.code {
                    ErrorCode::CycleNotFound | ErrorCode::TreatmentNotFound => $name::NotFound(err),
                    ErrorCode::ConcurrentModification => $name::Conflict(err),
                    ErrorCode::RemoteUnavailable | ErrorCode::InternalError => {
                        $name::Infrastructure(err)
                    }
                    _ => $name::Rejected(err),
                }
            }
        }
    };
}

pub(crate) use cycle_command_error;
