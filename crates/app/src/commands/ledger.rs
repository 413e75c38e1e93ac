//! Commitment ledger commands.

use clap::Args;
use uuid::Uuid;

use crate::error::Result;
use crate::output::{self, CommitmentRow, OutputFormat};
use crate::state::AppState;

/// Arguments for `commitments`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Whose commitments to show; defaults to your own
    #[arg(long, conflicts_with = "request")]
    pub volunteer: Option<Uuid>,

    /// Every commitment for one request
    #[arg(long)]
    pub request: Option<Uuid>,

    /// Include completed commitments
    #[arg(long)]
    pub all: bool,
}

pub fn commit(state: &AppState, request_id: Uuid, format: OutputFormat) -> Result<()> {
    let commitment = state.tracker().commit(&state.actor, request_id)?;
    output::print_item(&CommitmentRow::from(&commitment), format);
    Ok(())
}

pub fn progress(
    state: &AppState,
    commitment_id: Uuid,
    hours: f64,
    format: OutputFormat,
) -> Result<()> {
    let commitment = state
        .tracker()
        .record_progress(&state.actor, commitment_id, hours)?;
    output::print_item(&CommitmentRow::from(&commitment), format);
    Ok(())
}

pub fn reassign(
    state: &AppState,
    commitment_id: Uuid,
    volunteer_id: Uuid,
    format: OutputFormat,
) -> Result<()> {
    let commitment = state
        .tracker()
        .reassign(&state.actor, commitment_id, volunteer_id)?;
    output::print_item(&CommitmentRow::from(&commitment), format);
    Ok(())
}

pub fn target(
    state: &AppState,
    commitment_id: Uuid,
    hours: f64,
    format: OutputFormat,
) -> Result<()> {
    let commitment = state
        .tracker()
        .set_target_hours(&state.actor, commitment_id, hours)?;
    output::print_item(&CommitmentRow::from(&commitment), format);
    Ok(())
}

pub fn list(state: &AppState, args: &ListArgs, format: OutputFormat) -> Result<()> {
    let tracker = state.tracker();
    let commitments = match args.request {
        Some(request_id) => tracker.commitments_for_request(&state.actor, request_id)?,
        None => tracker.commitments_for_volunteer(
            &state.actor,
            args.volunteer.unwrap_or(state.actor.id),
            args.all,
        )?,
    };
    output::print_list(&output::rows::<_, CommitmentRow>(&commitments), format);
    Ok(())
}
