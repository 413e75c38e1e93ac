//! Application state management

use std::path::Path;
use std::time::Duration;

use tracing::{debug, instrument};
use vigil_assist::{Assistant, OpenAiBackend};
use vigil_core::{Actor, Config, Database, PrayerTracker};

use crate::error::Result;

/// Everything a command needs: configuration, the open database and the caller
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub actor: Actor,
}

impl AppState {
    /// Open the database named by `db_override`, else the configured one
    #[instrument(skip(config, db_override, actor), fields(actor = %actor.id, role = %actor.role))]
    pub fn open(config: Config, db_override: Option<&Path>, actor: Actor) -> Result<Self> {
        let db_path = match db_override {
            Some(path) => path.to_path_buf(),
            None => config.database_path()?,
        };

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!(path = %db_path.display(), "Opening database");
        let db = Database::open_with(
            &db_path,
            Duration::from_millis(config.database.busy_timeout_ms),
        )?;

        Ok(Self { config, db, actor })
    }

    pub fn tracker(&self) -> PrayerTracker<'_, Database> {
        PrayerTracker::new(&self.db, self.config.ledger)
    }

    /// Assistant for the configured text-completion service
    pub fn assistant(&self) -> Result<Assistant<OpenAiBackend>> {
        build_assistant(&self.config)
    }
}

fn build_assistant(config: &Config) -> Result<Assistant<OpenAiBackend>> {
    let settings = &config.assist;
    let backend = OpenAiBackend::from_env(
        settings.base_url.clone(),
        settings.model.clone(),
        &settings.api_key_env,
    )?;
    if !backend.has_api_key() {
        debug!(env = %settings.api_key_env, "No API key set, assist calls will use fallbacks");
    }
    Ok(Assistant::with_timeout(
        backend,
        Duration::from_millis(settings.timeout_ms),
    ))
}
