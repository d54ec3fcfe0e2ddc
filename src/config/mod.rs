//! Settings for the workflow engine.
//!
//! Everything is read from `TREATMENT_WORKFLOW__*` environment variables
//! (a `.env` file is honored in development). Sections nest with `__`, so
//! `TREATMENT_WORKFLOW__API__PAGE_SIZE=50` sets `api.page_size`.
//!
//! ```no_run
//! use treatment_workflow::config::{init_tracing, AppConfig};
//!
//! let settings = AppConfig::load()?;
//! settings.validate()?;
//! init_tracing(&settings.logging)?;
//! # Ok::<(), treatment_workflow::config::ConfigError>(())
//! ```

mod api;
mod error;
mod features;
mod logging;

pub use api::ApiConfig;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use logging::{init_tracing, LoggingConfig};

use serde::Deserialize;

const ENV_PREFIX: &str = "TREATMENT_WORKFLOW";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Clinic records API. `API__BASE_URL` has no default.
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Gates and automatic progression switches.
    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Reads settings from the process environment.
    ///
    /// Only parsing happens here; call [`AppConfig::validate`] before
    /// building clients from the result.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate()?;
        self.logging.validate()?;
        self.features.validate()
    }
}
