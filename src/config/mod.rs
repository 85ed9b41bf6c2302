//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `CAMPUS_INTAKE` prefix
//! and `__` between nested names.
//!
//! # Example
//!
//! ```no_run
//! use campus_intake::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod error;
mod intake;
mod server;
mod storage;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use intake::IntakeConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// manual-mode service backed by the bundled seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `.env` when present, then every `CAMPUS_INTAKE__*` variable:
    ///
    /// - `CAMPUS_INTAKE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CAMPUS_INTAKE__INTAKE__CONFIDENCE_THRESHOLD=80` -> `intake.confidence_threshold = 80`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CAMPUS_INTAKE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.intake.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "CAMPUS_INTAKE__SERVER__PORT",
        "CAMPUS_INTAKE__SERVER__ENVIRONMENT",
        "CAMPUS_INTAKE__AI__ENABLED",
        "CAMPUS_INTAKE__AI__ANTHROPIC_API_KEY",
        "CAMPUS_INTAKE__INTAKE__CONFIDENCE_THRESHOLD",
        "CAMPUS_INTAKE__INTAKE__MAX_ATTEMPTS",
        "CAMPUS_INTAKE__STORAGE__SEED_PATH",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        clear_env();
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(!config.ai.enabled);
        assert_eq!(config.intake.confidence_threshold, 70);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_values_are_read() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("CAMPUS_INTAKE__SERVER__PORT", "3000"),
            ("CAMPUS_INTAKE__INTAKE__CONFIDENCE_THRESHOLD", "80"),
            ("CAMPUS_INTAKE__INTAKE__MAX_ATTEMPTS", "3"),
            ("CAMPUS_INTAKE__STORAGE__SEED_PATH", "/etc/campus.yaml"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.intake.confidence_threshold, 80);
        assert_eq!(config.intake.max_attempts, Some(3));
        assert_eq!(config.storage.seed_path.to_str(), Some("/etc/campus.yaml"));
    }

    #[test]
    fn test_enabled_ai_with_key_is_active() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("CAMPUS_INTAKE__AI__ENABLED", "true"),
            ("CAMPUS_INTAKE__AI__ANTHROPIC_API_KEY", "sk-ant-xxx"),
        ])
        .unwrap();

        assert!(config.ai.is_active());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_enabled_ai_without_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("CAMPUS_INTAKE__AI__ENABLED", "true")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("CAMPUS_INTAKE__SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
    }
}
