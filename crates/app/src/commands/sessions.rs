//! Session log commands.

use clap::{Args, ValueEnum};
use uuid::Uuid;
use vigil_core::{Commitment, SessionLogEntry, SessionPreset};

use crate::error::{AppError, Result};
use crate::output::{self, CommitmentRow, OutputFormat, SessionRow};
use crate::state::AppState;

/// One-tap session lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    /// 15 minutes
    Quarter,
    /// 30 minutes
    Half,
    /// 45 minutes
    ThreeQuarters,
    /// 60 minutes
    Hour,
}

impl From<PresetArg> for SessionPreset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Quarter => SessionPreset::Quarter,
            PresetArg::Half => SessionPreset::Half,
            PresetArg::ThreeQuarters => SessionPreset::ThreeQuarters,
            PresetArg::Hour => SessionPreset::Hour,
        }
    }
}

/// Arguments for `log`
#[derive(Debug, Args)]
pub struct LogArgs {
    pub commitment_id: Uuid,

    /// Custom duration in minutes
    #[arg(short, long, conflicts_with = "preset")]
    pub minutes: Option<u32>,

    #[arg(short, long, value_enum)]
    pub preset: Option<PresetArg>,

    #[arg(short, long)]
    pub note: Option<String>,
}

impl LogArgs {
    pub fn minutes(&self) -> Result<u32> {
        match (self.minutes, self.preset) {
            (Some(minutes), _) => Ok(minutes),
            (None, Some(preset)) => Ok(SessionPreset::from(preset).minutes()),
            (None, None) => Err(AppError::Usage(
                "give a duration with --minutes or --preset".into(),
            )),
        }
    }
}

/// Arguments for `sessions`
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ListArgs {
    #[arg(long)]
    pub request: Option<Uuid>,

    #[arg(long)]
    pub commitment: Option<Uuid>,
}

pub fn log(state: &AppState, args: &LogArgs, format: OutputFormat) -> Result<()> {
    let (entry, commitment) = state.tracker().log_session(
        &state.actor,
        args.commitment_id,
        args.minutes()?,
        args.note.clone(),
    )?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!(
                "Logged {} minute(s) against commitment {}",
                entry.duration_minutes, entry.commitment_id
            ));
            output::print_item(&CommitmentRow::from(&commitment), format);
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&logged_json(&entry, &commitment))
                .unwrap_or_else(|_| "{}".to_string())
        ),
    }
    Ok(())
}

/// The logged session together with the progress it produced
fn logged_json(entry: &SessionLogEntry, commitment: &Commitment) -> serde_json::Value {
    serde_json::json!({
        "session": SessionRow::from(entry),
        "commitment": CommitmentRow::from(commitment),
    })
}

pub fn list(state: &AppState, args: &ListArgs, format: OutputFormat) -> Result<()> {
    let tracker = state.tracker();
    let entries = match (args.request, args.commitment) {
        (Some(request_id), _) => tracker.sessions_for_request(&state.actor, request_id)?,
        (None, Some(commitment_id)) => {
            tracker.sessions_for_commitment(&state.actor, commitment_id)?
        }
        (None, None) => {
            return Err(AppError::Usage(
                "give --request or --commitment".into(),
            ))
        }
    };
    output::print_list(&output::rows::<_, SessionRow>(&entries), format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_requires_a_duration() {
        let args = LogArgs {
            commitment_id: Uuid::new_v4(),
            minutes: None,
            preset: None,
            note: None,
        };
        assert!(matches!(args.minutes(), Err(AppError::Usage(_))));
    }

    #[test]
    fn test_logged_json_includes_commitment_progress() {
        let request = vigil_core::NewRequest::new("Healing")
            .into_request()
            .unwrap();
        let mut commitment = Commitment::new(&request, Uuid::new_v4(), 1.0);
        commitment.accumulated_hours = 1.0;
        commitment.completed = true;
        let entry = SessionLogEntry::new(
            commitment.id,
            commitment.volunteer_id,
            request.id,
            60,
            None,
        )
        .unwrap();

        let value = logged_json(&entry, &commitment);
        assert_eq!(value["session"]["minutes"], 60);
        assert_eq!(value["commitment"]["progress"], "1.00/1.00");
        assert_eq!(value["commitment"]["completed"], true);
    }

    #[test]
    fn test_custom_minutes_win() {
        let args = LogArgs {
            commitment_id: Uuid::new_v4(),
            minutes: Some(20),
            preset: None,
            note: None,
        };
        assert_eq!(args.minutes().unwrap(), 20);
    }
}
