//! Task-level helpers over a completion backend
//!
//! Each task has a fallible `try_*` form and an infallible form that logs
//! the failure and returns the fixed fallback. Callers on a write path use
//! the infallible form so the service can never block or fail the write.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::backend::CompletionBackend;
use crate::error::{Error, Result};
use crate::prompts::{Prompt, FALLBACK_ENCOURAGEMENT, FALLBACK_TRENDS, FALLBACK_VERSE};

/// Default bound on a single completion call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8_000);

/// Day offset extracted from free-text timeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEstimate {
    pub days: Option<i64>,
    pub deadline: Option<String>,
}

/// How often a warrior should be reminded to pray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderFrequency {
    #[default]
    Daily,
    TwiceDaily,
    Weekly,
}

impl ReminderFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderFrequency::Daily => "daily",
            ReminderFrequency::TwiceDaily => "twice-daily",
            ReminderFrequency::Weekly => "weekly",
        }
    }

    /// Read a free-text model reply; anything unrecognised means daily
    pub fn from_reply(reply: &str) -> Self {
        let reply = reply.trim().to_lowercase();
        if reply.contains("twice") {
            ReminderFrequency::TwiceDaily
        } else if reply.contains("weekly") {
            ReminderFrequency::Weekly
        } else {
            ReminderFrequency::Daily
        }
    }
}

impl fmt::Display for ReminderFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "daily" => Ok(ReminderFrequency::Daily),
            "twice-daily" => Ok(ReminderFrequency::TwiceDaily),
            "weekly" => Ok(ReminderFrequency::Weekly),
            other => Err(Error::Parse(format!("unknown reminder frequency '{}'", other))),
        }
    }
}

/// Prayer-support helpers backed by a text-completion service
pub struct Assistant<B: CompletionBackend> {
    backend: B,
    timeout: Duration,
}

impl<B: CompletionBackend> Assistant<B> {
    pub fn new(backend: B) -> Self {
        Self::with_timeout(backend, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(backend: B, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn ask(&self, prompt: Prompt) -> Result<String> {
        tokio::time::timeout(self.timeout, self.backend.complete(&prompt))
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_millis() as u64))?
    }

    #[instrument(skip(self, text), fields(backend = %self.backend.id()))]
    pub async fn try_timeline(&self, text: &str) -> Result<TimelineEstimate> {
        let reply = self.ask(Prompt::timeline(text)).await?;
        parse_timeline(&reply)
    }

    /// Timeline offset, or no offset when the service fails
    pub async fn timeline(&self, text: &str) -> TimelineEstimate {
        match self.try_timeline(text).await {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!(error = %e, "Timeline extraction failed, continuing without one");
                TimelineEstimate::default()
            }
        }
    }

    #[instrument(skip(self, request_text), fields(backend = %self.backend.id()))]
    pub async fn try_verse(&self, request_text: &str, category: &str) -> Result<String> {
        self.ask(Prompt::verse(request_text, category)).await
    }

    pub async fn verse(&self, request_text: &str, category: &str) -> String {
        self.try_verse(request_text, category)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Verse suggestion failed");
                FALLBACK_VERSE.to_string()
            })
    }

    #[instrument(skip(self, request_text), fields(backend = %self.backend.id()))]
    pub async fn try_encouragement(&self, request_text: &str) -> Result<String> {
        self.ask(Prompt::encouragement(request_text)).await
    }

    pub async fn encouragement(&self, request_text: &str) -> String {
        self.try_encouragement(request_text)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Encouragement generation failed");
                FALLBACK_ENCOURAGEMENT.to_string()
            })
    }

    /// Leadership insight over (category, title) pairs
    #[instrument(skip(self, requests), fields(backend = %self.backend.id()))]
    pub async fn try_trends(&self, requests: &[(String, String)]) -> Result<String> {
        let prompt = Prompt::trends(requests.iter().map(|(c, t)| (c.as_str(), t.as_str())));
        self.ask(prompt).await
    }

    pub async fn trends(&self, requests: &[(String, String)]) -> String {
        self.try_trends(requests).await.unwrap_or_else(|e| {
            warn!(error = %e, "Trend analysis failed");
            FALLBACK_TRENDS.to_string()
        })
    }

    #[instrument(skip(self), fields(backend = %self.backend.id()))]
    pub async fn try_reminder_frequency(
        &self,
        timeline: Option<&str>,
        category: &str,
    ) -> Result<ReminderFrequency> {
        let reply = self
            .ask(Prompt::reminder_frequency(timeline, category))
            .await?;
        Ok(ReminderFrequency::from_reply(&reply))
    }

    pub async fn reminder_frequency(
        &self,
        timeline: Option<&str>,
        category: &str,
    ) -> ReminderFrequency {
        self.try_reminder_frequency(timeline, category)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Reminder frequency failed");
                ReminderFrequency::default()
            })
    }
}

/// Pull the JSON object out of a timeline reply.
///
/// Models sometimes wrap the object in prose or a code fence, so the
/// outermost braces are located first. Negative offsets are discarded.
pub fn parse_timeline(reply: &str) -> Result<TimelineEstimate> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &reply[s..=e],
        _ => return Err(Error::Parse(format!("no JSON object in reply: {}", reply))),
    };

    let mut estimate: TimelineEstimate =
        serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
    if estimate.days.is_some_and(|d| d < 0) {
        estimate.days = None;
    }
    Ok(estimate)
}
