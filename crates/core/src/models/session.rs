//! Prayer session log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Durations offered as one-tap choices when logging prayer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPreset {
    Quarter,
    Half,
    ThreeQuarters,
    Hour,
}

impl SessionPreset {
    pub fn minutes(&self) -> u32 {
        match self {
            SessionPreset::Quarter => 15,
            SessionPreset::Half => 30,
            SessionPreset::ThreeQuarters => 45,
            SessionPreset::Hour => 60,
        }
    }

    pub fn all() -> &'static [SessionPreset] {
        &[
            SessionPreset::Quarter,
            SessionPreset::Half,
            SessionPreset::ThreeQuarters,
            SessionPreset::Hour,
        ]
    }
}

/// One logged prayer session. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLogEntry {
    pub id: Uuid,
    pub commitment_id: Uuid,
    pub volunteer_id: Uuid,
    pub request_id: Uuid,
    pub duration_minutes: u32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionLogEntry {
    pub fn new(
        commitment_id: Uuid,
        volunteer_id: Uuid,
        request_id: Uuid,
        duration_minutes: u32,
        note: Option<String>,
    ) -> Result<Self> {
        validate_minutes(duration_minutes)?;
        Ok(Self {
            id: Uuid::new_v4(),
            commitment_id,
            volunteer_id,
            request_id,
            duration_minutes,
            note: note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            created_at: Utc::now(),
        })
    }

    pub fn hours(&self) -> f64 {
        minutes_to_hours(self.duration_minutes)
    }
}

pub fn minutes_to_hours(minutes: u32) -> f64 {
    f64::from(minutes) / 60.0
}

/// A session must last at least one minute
pub fn validate_minutes(minutes: u32) -> Result<()> {
    if minutes == 0 {
        return Err(Error::InvalidDuration(
            "session duration must be a positive number of minutes".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let minutes: Vec<u32> = SessionPreset::all().iter().map(|p| p.minutes()).collect();
        assert_eq!(minutes, vec![15, 30, 45, 60]);
    }

    #[test]
    fn test_zero_minutes_rejected() {
        let err = SessionLogEntry::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 0, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDuration(_)));
    }

    #[test]
    fn test_blank_note_dropped() {
        let entry = SessionLogEntry::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            45,
            Some("   ".into()),
        )
        .unwrap();
        assert!(entry.note.is_none());
        assert_eq!(entry.hours(), 0.75);
    }
}
