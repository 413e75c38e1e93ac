//! Request registry commands.

use clap::{Args, ValueEnum};
use uuid::Uuid;
use vigil_core::{Contact, NewRequest, PrivacyLevel, RequestFilter};

use crate::error::Result;
use crate::intake;
use crate::output::{self, OutputFormat, RequestRow};
use crate::state::AppState;

/// Arguments for `submit`
#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// What to pray for
    pub description: String,

    /// Short title; defaults to the start of the description
    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub category: Option<String>,

    /// Hide the requester's name
    #[arg(long)]
    pub anonymous: bool,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Free-text timeline, e.g. "surgery on Friday"
    #[arg(long)]
    pub timeline: Option<String>,

    /// Day offset, skipping timeline extraction
    #[arg(long)]
    pub days: Option<i64>,
}

impl SubmitArgs {
    fn to_submission(&self) -> NewRequest {
        let mut submission = NewRequest::new(self.description.clone())
            .with_privacy(if self.anonymous {
                PrivacyLevel::Anonymous
            } else {
                PrivacyLevel::Public
            })
            .with_contact(Contact {
                name: self.name.clone(),
                phone: self.phone.clone(),
                email: self.email.clone(),
            })
            .with_timeline_days(self.days);
        if let Some(title) = &self.title {
            submission = submission.with_title(title.clone());
        }
        if let Some(category) = &self.category {
            submission = submission.with_category(category.clone());
        }
        if let Some(timeline) = &self.timeline {
            submission = submission.with_timeline(timeline.clone());
        }
        submission
    }
}

/// Status filter for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    All,
    Active,
    Answered,
}

impl From<StatusArg> for RequestFilter {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::All => RequestFilter::All,
            StatusArg::Active => RequestFilter::Active,
            StatusArg::Answered => RequestFilter::Answered,
        }
    }
}

/// Arguments for `requests`
#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(short, long, value_enum, default_value = "active")]
    pub status: StatusArg,
}

pub async fn submit(state: &AppState, args: &SubmitArgs, format: OutputFormat) -> Result<()> {
    let assistant = state.assistant()?;
    let request = intake::submit_request(
        &state.tracker(),
        &assistant,
        &state.actor,
        args.to_submission(),
    )
    .await?;

    output::print_item(&RequestRow::from(&request), format);
    Ok(())
}

pub fn list(state: &AppState, args: &ListArgs, format: OutputFormat) -> Result<()> {
    let requests = state
        .tracker()
        .list_requests(&state.actor, args.status.into())?;
    output::print_list(&output::rows::<_, RequestRow>(&requests), format);
    Ok(())
}

pub fn available(state: &AppState, format: OutputFormat) -> Result<()> {
    let requests = state.tracker().available_for(&state.actor)?;
    output::print_list(&output::rows::<_, RequestRow>(&requests), format);
    Ok(())
}

pub fn answer(state: &AppState, id: Uuid, format: OutputFormat) -> Result<()> {
    let request = state.tracker().mark_answered(&state.actor, id)?;
    output::print_item(&RequestRow::from(&request), format);
    Ok(())
}

pub fn delete(state: &AppState, id: Uuid) -> Result<()> {
    let report = state.tracker().delete(&state.actor, id)?;
    output::print_success(&format!(
        "Deleted request {} with {} commitment(s) and {} session(s)",
        id, report.commitments_removed, report.sessions_removed
    ));
    Ok(())
}
