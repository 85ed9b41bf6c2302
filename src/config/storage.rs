//! Storage configuration: seed catalog, media, overlay and database.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// YAML campus seed (reporters, areas, buildings, rooms)
    #[serde(default = "default_seed_path")]
    pub seed_path: PathBuf,

    /// Directory for locally stored uploads
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// JSON file holding runtime settings overrides
    #[serde(default = "default_overrides_path")]
    pub overrides_path: PathBuf,

    /// PostgreSQL URL; submissions stay in memory when unset
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Run migrations on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl StorageConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// The database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.seed_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__SEED_PATH"));
        }
        if self.media_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__MEDIA_DIR"));
        }
        if let Some(url) = self.database_url() {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(ValidationError::InvalidDatabaseUrl);
            }
            if self.max_connections == 0 || self.max_connections > 100 {
                return Err(ValidationError::InvalidPoolSize);
            }
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            seed_path: default_seed_path(),
            media_dir: default_media_dir(),
            overrides_path: default_overrides_path(),
            database_url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_seed_path() -> PathBuf {
    PathBuf::from("data/campus.yaml")
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("data/media")
}

fn default_overrides_path() -> PathBuf {
    PathBuf::from("data/settings.json")
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_run_migrations() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_without_database() {
        let config = StorageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.database_url(), None);
    }

    #[test]
    fn blank_database_url_is_ignored() {
        let config = StorageConfig {
            database_url: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(config.database_url(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn database_url_must_be_postgres() {
        let config = StorageConfig {
            database_url: Some("mysql://localhost/db".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn pool_size_is_bounded() {
        let config = StorageConfig {
            database_url: Some("postgres://localhost/intake".into()),
            max_connections: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidPoolSize)));
    }
}
