//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};
use vigil_core::{Commitment, PrayerRequest, RequestSummary, SessionLogEntry};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of rows in the selected format
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a single row in the selected format
pub fn print_item<T: Serialize + Tabled>(row: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", Table::new([row])),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(row).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print free text, or a JSON object holding it under `key`
pub fn print_text(key: &str, text: &str, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", text),
        OutputFormat::Json => {
            let mut object = serde_json::Map::new();
            object.insert(key.to_string(), text.into());
            println!("{}", serde_json::Value::Object(object));
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

fn hours(value: f64) -> String {
    format!("{:.2}", value)
}

/// Request display row
#[derive(Debug, Serialize, Tabled)]
pub struct RequestRow {
    id: String,
    title: String,
    category: String,
    status: String,
    requester: String,
    timeline: String,
    created_at: String,
}

impl From<&PrayerRequest> for RequestRow {
    fn from(r: &PrayerRequest) -> Self {
        let timeline = match (r.timeline_text.as_deref(), r.timeline_days) {
            (Some(text), Some(days)) => format!("{} ({}d)", text, days),
            (Some(text), None) => text.to_string(),
            (None, Some(days)) => format!("{}d", days),
            (None, None) => String::new(),
        };
        Self {
            id: r.id.to_string(),
            title: r.title.clone(),
            category: r.category.clone(),
            status: r.status.to_string(),
            requester: r.display_name().to_string(),
            timeline,
            created_at: r.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Commitment display row
#[derive(Debug, Serialize, Tabled)]
pub struct CommitmentRow {
    id: String,
    request_id: String,
    volunteer_id: String,
    progress: String,
    deadline: String,
    completed: bool,
}

impl From<&Commitment> for CommitmentRow {
    fn from(c: &Commitment) -> Self {
        Self {
            id: c.id.to_string(),
            request_id: c.request_id.to_string(),
            volunteer_id: c.volunteer_id.to_string(),
            progress: format!("{}/{}", hours(c.accumulated_hours), hours(c.target_hours)),
            deadline: c
                .deadline
                .map(|d| d.to_string())
                .unwrap_or_default(),
            completed: c.completed,
        }
    }
}

/// Session log display row
#[derive(Debug, Serialize, Tabled)]
pub struct SessionRow {
    id: String,
    commitment_id: String,
    volunteer_id: String,
    minutes: u32,
    note: String,
    logged_at: String,
}

impl From<&SessionLogEntry> for SessionRow {
    fn from(e: &SessionLogEntry) -> Self {
        Self {
            id: e.id.to_string(),
            commitment_id: e.commitment_id.to_string(),
            volunteer_id: e.volunteer_id.to_string(),
            minutes: e.duration_minutes,
            note: e.note.clone().unwrap_or_default(),
            logged_at: e.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Dashboard summary row
#[derive(Debug, Serialize, Tabled)]
pub struct SummaryRow {
    id: String,
    title: String,
    status: String,
    warriors: u64,
    hours: String,
}

impl From<&RequestSummary> for SummaryRow {
    fn from(s: &RequestSummary) -> Self {
        Self {
            id: s.request.id.to_string(),
            title: s.request.title.clone(),
            status: s.request.status.to_string(),
            warriors: s.warriors_count,
            hours: hours(s.total_hours),
        }
    }
}

pub fn rows<'a, T, R>(items: &'a [T]) -> Vec<R>
where
    R: From<&'a T>,
{
    items.iter().map(R::from).collect()
}
