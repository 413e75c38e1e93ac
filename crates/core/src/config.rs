//! Configuration file schema and loader
//!
//! Settings are read from `vigil.toml`. Every field has a default, so a
//! missing file or a partial file is valid.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{is_valid_hours, ReassignProgress, DEFAULT_TARGET_HOURS};

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "vigil.toml";

/// Name of the database file inside the data directory
pub const DATABASE_FILE_NAME: &str = "vigil.db";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ledger: LedgerConfig,
    pub assist: AssistSettings,
    pub logging: LoggingConfig,
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; defaults to the platform data directory
    pub path: Option<PathBuf>,
    /// How long a writer waits for a competing transaction
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Commitment ledger policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Hours pledged by a new commitment
    pub default_target_hours: f64,
    /// Whether reassignment keeps or clears progress
    pub reassign_progress: ReassignProgress,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_target_hours: DEFAULT_TARGET_HOURS,
            reassign_progress: ReassignProgress::Carry,
        }
    }
}

/// Text-completion service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistSettings {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_ms: u64,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_ms: 8_000,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from an explicit path, else the platform config file, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match project_dirs() {
            Some(dirs) => {
                let path = dirs.config_dir().join(CONFIG_FILE_NAME);
                if path.exists() {
                    tracing::debug!(path = %path.display(), "Loading configuration");
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
            None => Ok(Self::default()),
        }
    }

    /// Reject values the ledger cannot work with
    pub fn validate(&self) -> Result<()> {
        if !is_valid_hours(self.ledger.default_target_hours) {
            return Err(Error::Config(format!(
                "ledger.default_target_hours must be positive, got {}",
                self.ledger.default_target_hours
            )));
        }
        if self.assist.timeout_ms == 0 {
            return Err(Error::Config("assist.timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// Resolved database location
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        let dirs = project_dirs().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;
        Ok(dirs.data_dir().join(DATABASE_FILE_NAME))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "vigil", "vigil")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.ledger.default_target_hours, 4.0);
        assert_eq!(config.ledger.reassign_progress, ReassignProgress::Carry);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[database]
path = "/var/lib/vigil/vigil.db"
busy_timeout_ms = 250

[ledger]
default_target_hours = 2.5
reassign_progress = "reset"

[assist]
base_url = "http://localhost:11434/v1"
model = "llama3.2"
timeout_ms = 1500

[logging]
filter = "vigil_core=debug"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/var/lib/vigil/vigil.db")
        );
        assert_eq!(config.ledger.default_target_hours, 2.5);
        assert_eq!(config.ledger.reassign_progress, ReassignProgress::Reset);
        assert_eq!(config.assist.model, "llama3.2");
        assert_eq!(config.assist.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.logging.filter, "vigil_core=debug");
    }

    #[test]
    fn test_non_positive_target_rejected() {
        let err = Config::from_toml("[ledger]\ndefault_target_hours = 0.0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = Config::from_toml("[ledger]\nreassign_progress = \"split\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[logging]\nfilter = \"info\"\n").unwrap();

        let config = Config::discover(Some(&path)).unwrap();
        assert_eq!(config.logging.filter, "info");
    }
}
