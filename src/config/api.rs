//! Clinic records API configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Connection settings for the clinic records API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://clinic.example.com/api`
    pub base_url: String,

    /// Bearer token sent with every request
    #[serde(default)]
    pub token: Option<Secret<String>>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Page size used when listing cycles
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_secs: default_timeout(),
            page_size: default_page_size(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Secret::new(token.into()));
        self
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Check if a non-empty token is configured
    pub fn has_token(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }

    /// Validate API configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("API__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidApiUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.page_size == 0 || self.page_size > 1000 {
            return Err(ValidationError::InvalidPageSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ApiConfig::new("https://clinic.example.com/api/");
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), "https://clinic.example.com/api");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.has_token());
    }

    #[test]
    fn rejects_non_http_url() {
        let config = ApiConfig::new("clinic.example.com");
        assert_eq!(config.validate(), Err(ValidationError::InvalidApiUrl));
    }

    #[test]
    fn rejects_zero_timeout_and_page_size() {
        let mut config = ApiConfig::new("http://localhost:8080");
        config.timeout_secs = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));

        config.timeout_secs = 10;
        config.page_size = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidPageSize));
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let config = ApiConfig::new("http://localhost").with_token("s3cret");
        assert!(config.has_token());
        assert!(!format!("{:?}", config).contains("s3cret"));
    }
}
