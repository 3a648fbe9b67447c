use anyhow::Result;
use std::path::Path;

use crate::config::ValidationResult;
use crate::{Config, ConfigError};

/// Application configuration and lifecycle.
pub struct App {
    config: Config,
    validation: ValidationResult,
}

impl App {
    /// Load and validate configuration, from `config_path` when given or the
    /// platform default otherwise.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let (config, validation) = Config::load_validated(config_path)?;
        Ok(Self::with_config(config, validation))
    }

    /// Build an application around an already-loaded configuration.
    pub fn with_config(config: Config, validation: ValidationResult) -> Self {
        Self { config, validation }
    }

    /// Override the backend base URL (command line flag).
    ///
    /// The overridden configuration is validated again; on errors the
    /// current configuration is left as it was.
    pub fn override_api_base(&mut self, base_url: &str) -> Result<()> {
        let mut config = self.config.clone();
        config.api.base_url = base_url.trim().to_string();

        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        tracing::info!("Overriding API base URL: {}", config.api.base_url);
        self.config = config;
        self.validation = validation;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Warnings collected while validating the configuration.
    pub fn warnings(&self) -> &[crate::config::ConfigValidationError] {
        &self.validation.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_api_base() {
        let mut app = App::with_config(Config::default(), ValidationResult::default());
        app.override_api_base("http://127.0.0.1:9000").unwrap();
        assert_eq!(app.config().api.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_override_is_config_error() {
        let mut app = App::with_config(Config::default(), ValidationResult::default());
        let before = app.config().api.base_url.clone();

        let err = app.override_api_base("ftp://example.com").unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>();
        assert!(matches!(config_err, Some(ConfigError::Invalid(msg)) if msg.contains("api.base_url")));
        assert_eq!(app.config().api.base_url, before);

        assert!(app.override_api_base("not a url").is_err());
    }

    #[test]
    fn test_new_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let app = App::new(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(app.config().api.request_timeout_secs, 10);
    }
}
