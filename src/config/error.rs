use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings from the environment: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(#[from] ValidationError),

    #[error("cannot install tracing subscriber: {0}")]
    Tracing(String),
}

/// A setting that parsed but cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingRequired(&'static str),

    #[error("clinic API base URL must be http(s)")]
    InvalidApiUrl,

    #[error("request timeout must be 1..=300 seconds")]
    InvalidTimeout,

    #[error("page size must be in 1..=1000")]
    InvalidPageSize,

    #[error("bad log filter: {0}")]
    InvalidLogFilter(String),

    #[error("resolution cache needs room for at least one entry")]
    InvalidCacheCapacity,
}
