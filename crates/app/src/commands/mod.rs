//! CLI command definitions and dispatch.

pub mod insight;
pub mod ledger;
pub mod requests;
pub mod sessions;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;
use vigil_core::{Actor, Config, Role};

use crate::error::{AppError, Result};
use crate::output::OutputFormat;
use crate::state::AppState;

/// Vigil - prayer request fulfillment tracker
#[derive(Debug, Parser)]
#[command(name = "vigil", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "VIGIL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configured one
    #[arg(long, env = "VIGIL_DB")]
    pub db: Option<PathBuf>,

    /// Id of the acting user
    #[arg(long = "as", env = "VIGIL_ACTOR", value_name = "UUID")]
    pub actor_id: Option<Uuid>,

    /// Role of the acting user
    #[arg(long, env = "VIGIL_ROLE", default_value = "guest")]
    pub role: Role,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Submit a prayer request
    Submit(requests::SubmitArgs),
    /// List prayer requests
    Requests(requests::ListArgs),
    /// Active requests you have not committed to
    Available,
    /// Mark a request answered
    Answer { id: Uuid },
    /// Delete a request with its commitments and sessions
    Delete { id: Uuid },
    /// Commit to pray for a request
    Commit { request_id: Uuid },
    /// Credit hours directly to a commitment
    Progress { commitment_id: Uuid, hours: f64 },
    /// Log a prayer session
    Log(sessions::LogArgs),
    /// Move a commitment to another volunteer
    Reassign {
        commitment_id: Uuid,
        volunteer_id: Uuid,
    },
    /// Change a commitment's target hours
    Target { commitment_id: Uuid, hours: f64 },
    /// List commitments
    Commitments(ledger::ListArgs),
    /// List logged sessions
    Sessions(sessions::ListArgs),
    /// Dashboard totals and per-request coverage
    Stats(insight::StatsArgs),
    /// Suggest a Bible verse for a request
    Verse { request_id: Uuid },
    /// Write an encouragement for a request
    Encourage { request_id: Uuid },
    /// Summarise themes across active requests
    Trends,
    /// Recommend how often to pray for a request
    Remind { request_id: Uuid },
}

impl Cli {
    /// The actor named on the command line
    pub fn actor(&self) -> Result<Actor> {
        match (self.actor_id, self.role) {
            (Some(id), role) => Ok(Actor::new(id, role)),
            (None, Role::Guest) => Ok(Actor::guest()),
            (None, role) => Err(AppError::Usage(format!(
                "--as <UUID> is required when acting as {}",
                role
            ))),
        }
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: Config) -> Result<()> {
        let state = AppState::open(config, self.db.as_deref(), self.actor()?)?;
        let format = self.format;

        match &self.command {
            Commands::Submit(args) => requests::submit(&state, args, format).await,
            Commands::Requests(args) => requests::list(&state, args, format),
            Commands::Available => requests::available(&state, format),
            Commands::Answer { id } => requests::answer(&state, *id, format),
            Commands::Delete { id } => requests::delete(&state, *id),
            Commands::Commit { request_id } => ledger::commit(&state, *request_id, format),
            Commands::Progress {
                commitment_id,
                hours,
            } => ledger::progress(&state, *commitment_id, *hours, format),
            Commands::Log(args) => sessions::log(&state, args, format),
            Commands::Reassign {
                commitment_id,
                volunteer_id,
            } => ledger::reassign(&state, *commitment_id, *volunteer_id, format),
            Commands::Target {
                commitment_id,
                hours,
            } => ledger::target(&state, *commitment_id, *hours, format),
            Commands::Commitments(args) => ledger::list(&state, args, format),
            Commands::Sessions(args) => sessions::list(&state, args, format),
            Commands::Stats(args) => insight::stats(&state, args, format),
            Commands::Verse { request_id } => insight::verse(&state, *request_id, format).await,
            Commands::Encourage { request_id } => {
                insight::encourage(&state, *request_id, format).await
            }
            Commands::Trends => insight::trends(&state, format).await,
            Commands::Remind { request_id } => insight::remind(&state, *request_id, format).await,
        }
    }
}
