//! Prayer request model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Category used when the requester does not pick one
pub const DEFAULT_CATEGORY: &str = "General";

/// Derived titles are cut to this many characters of the description
pub const DERIVED_TITLE_CHARS: usize = 80;

/// Longest accepted timeline offset, roughly a century
pub const MAX_TIMELINE_DAYS: i64 = 36_500;

/// Whether a day offset yields a representable deadline
pub fn is_valid_timeline_days(days: i64) -> bool {
    (0..=MAX_TIMELINE_DAYS).contains(&days)
}

/// Who may see the requester's identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    #[default]
    Public,
    Anonymous,
}

impl PrivacyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyLevel::Public => "public",
            PrivacyLevel::Anonymous => "anonymous",
        }
    }
}

impl FromStr for PrivacyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public" => Ok(PrivacyLevel::Public),
            "anonymous" => Ok(PrivacyLevel::Anonymous),
            other => Err(Error::InvalidInput(format!(
                "privacy level must be 'public' or 'anonymous', got '{}'",
                other
            ))),
        }
    }
}

/// Request lifecycle status. `Answered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Active,
    Answered,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Active => "active",
            RequestStatus::Answered => "answered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(RequestStatus::Active),
            "answered" => Some(RequestStatus::Answered),
            _ => None,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status filter for request listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestFilter {
    All,
    #[default]
    Active,
    Answered,
}

impl RequestFilter {
    pub fn status(&self) -> Option<RequestStatus> {
        match self {
            RequestFilter::All => None,
            RequestFilter::Active => Some(RequestStatus::Active),
            RequestFilter::Answered => Some(RequestStatus::Answered),
        }
    }
}

/// Optional requester contact details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Contact {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// A submitted prayer request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerRequest {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub privacy: PrivacyLevel,
    pub requester_name: Option<String>,
    pub requester_phone: Option<String>,
    pub requester_email: Option<String>,
    pub timeline_text: Option<String>,
    pub timeline_days: Option<i64>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl PrayerRequest {
    pub fn is_active(&self) -> bool {
        self.status == RequestStatus::Active
    }

    /// Name to show in listings; anonymous requests never reveal one
    pub fn display_name(&self) -> &str {
        match (self.privacy, self.requester_name.as_deref()) {
            (PrivacyLevel::Public, Some(name)) if !name.trim().is_empty() => name,
            _ => "Anonymous",
        }
    }
}

/// A request submission before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRequest {
    pub title: Option<String>,
    pub description: String,
    pub category: Option<String>,
    pub privacy: PrivacyLevel,
    pub contact: Contact,
    pub timeline_text: Option<String>,
    pub timeline_days: Option<i64>,
}

impl NewRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_privacy(mut self, privacy: PrivacyLevel) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = contact;
        self
    }

    pub fn with_timeline(mut self, text: impl Into<String>) -> Self {
        self.timeline_text = Some(text.into());
        self
    }

    /// Day offset resolved from the timeline text, if any
    pub fn with_timeline_days(mut self, days: Option<i64>) -> Self {
        self.timeline_days = days;
        self
    }

    /// Validate the submission and produce an active request
    pub fn into_request(self) -> Result<PrayerRequest> {
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(Error::InvalidInput("description is required".into()));
        }

        let title = match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            Some(_) => return Err(Error::InvalidInput("title must not be blank".into())),
            None => description.chars().take(DERIVED_TITLE_CHARS).collect(),
        };

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        if let Some(days) = self.timeline_days {
            if !is_valid_timeline_days(days) {
                return Err(Error::InvalidInput(format!(
                    "timeline_days must be between 0 and {}, got {}",
                    MAX_TIMELINE_DAYS, days
                )));
            }
        }

        let requester_name = match self.privacy {
            PrivacyLevel::Anonymous => None,
            PrivacyLevel::Public => non_blank(self.contact.name),
        };

        Ok(PrayerRequest {
            id: Uuid::new_v4(),
            title,
            description,
            category,
            privacy: self.privacy,
            requester_name,
            requester_phone: non_blank(self.contact.phone),
            requester_email: non_blank(self.contact.email),
            timeline_text: non_blank(self.timeline_text),
            timeline_days: self.timeline_days,
            status: RequestStatus::Active,
            created_at: Utc::now(),
            answered_at: None,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
