//! Dashboard and assistant-backed commands.

use clap::Args;
use uuid::Uuid;
use vigil_core::RequestFilter;

use crate::commands::requests::StatusArg;
use crate::error::Result;
use crate::output::{self, OutputFormat, SummaryRow};
use crate::state::AppState;

/// Arguments for `stats`
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Which requests to summarise
    #[arg(short, long, value_enum, default_value = "all")]
    pub status: StatusArg,
}

pub fn stats(state: &AppState, args: &StatsArgs, format: OutputFormat) -> Result<()> {
    let tracker = state.tracker();
    let totals = tracker.stats(&state.actor)?;
    let summaries = tracker.request_summaries(&state.actor, args.status.into())?;

    match format {
        OutputFormat::Table => {
            println!("Prayer dashboard");
            output::print_kv("Total requests", &totals.total_requests.to_string());
            output::print_kv("Answered", &totals.answered_requests.to_string());
            output::print_kv("Hours prayed", &format!("{:.2}", totals.total_hours));
            output::print_kv("Active warriors", &totals.active_warriors.to_string());
            println!();
            output::print_list(&output::rows::<_, SummaryRow>(&summaries), format);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "stats": totals,
                "requests": output::rows::<_, SummaryRow>(&summaries),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
    Ok(())
}

pub async fn verse(state: &AppState, request_id: Uuid, format: OutputFormat) -> Result<()> {
    let request = state.tracker().request(&state.actor, request_id)?;
    let verse = state
        .assistant()?
        .verse(&request.description, &request.category)
        .await;
    output::print_text("verse", &verse, format);
    Ok(())
}

pub async fn encourage(state: &AppState, request_id: Uuid, format: OutputFormat) -> Result<()> {
    let request = state.tracker().request(&state.actor, request_id)?;
    let message = state
        .assistant()?
        .encouragement(&request.description)
        .await;
    output::print_text("encouragement", &message, format);
    Ok(())
}

pub async fn trends(state: &AppState, format: OutputFormat) -> Result<()> {
    let requests = state
        .tracker()
        .list_requests(&state.actor, RequestFilter::Active)?;
    let pairs: Vec<(String, String)> = requests
        .into_iter()
        .map(|r| (r.category, r.title))
        .collect();
    let summary = state.assistant()?.trends(&pairs).await;
    output::print_text("trends", &summary, format);
    Ok(())
}

pub async fn remind(state: &AppState, request_id: Uuid, format: OutputFormat) -> Result<()> {
    let request = state.tracker().request(&state.actor, request_id)?;
    let frequency = state
        .assistant()?
        .reminder_frequency(request.timeline_text.as_deref(), &request.category)
        .await;
    output::print_text("frequency", frequency.as_str(), format);
    Ok(())
}
