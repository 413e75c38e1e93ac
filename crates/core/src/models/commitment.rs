//! Prayer commitment model

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PrayerRequest;

/// Prayer hours a warrior pledges unless configured otherwise
pub const DEFAULT_TARGET_HOURS: f64 = 4.0;

/// Derived progress state of a commitment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentState {
    Pending,
    Completed,
}

impl CommitmentState {
    /// Recompute the state from progress numbers
    pub fn from_progress(accumulated_hours: f64, target_hours: f64) -> Self {
        if accumulated_hours >= target_hours {
            CommitmentState::Completed
        } else {
            CommitmentState::Pending
        }
    }
}

/// What happens to progress when a commitment moves to another volunteer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReassignProgress {
    /// The new volunteer inherits the hours already prayed
    #[default]
    Carry,
    /// The new volunteer starts from zero
    Reset,
}

/// A volunteer's pledge to pray for a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commitment {
    pub id: Uuid,
    pub request_id: Uuid,
    pub volunteer_id: Uuid,
    pub target_hours: f64,
    pub accumulated_hours: f64,
    pub deadline: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Commitment {
    /// Pledge `volunteer_id` to `request`; deadline follows the request's timeline
    pub fn new(request: &PrayerRequest, volunteer_id: Uuid, target_hours: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id: request.id,
            volunteer_id,
            target_hours,
            accumulated_hours: 0.0,
            deadline: deadline_for(request),
            completed: CommitmentState::from_progress(0.0, target_hours)
                == CommitmentState::Completed,
            created_at: Utc::now(),
        }
    }

    pub fn state(&self) -> CommitmentState {
        CommitmentState::from_progress(self.accumulated_hours, self.target_hours)
    }

    /// Hours still needed to reach the target
    pub fn remaining_hours(&self) -> f64 {
        (self.target_hours - self.accumulated_hours).max(0.0)
    }

    /// Whether the stored flag agrees with the progress numbers
    pub fn is_consistent(&self) -> bool {
        self.completed == (self.state() == CommitmentState::Completed)
    }
}

/// Submission date plus the request's timeline offset
pub fn deadline_for(request: &PrayerRequest) -> Option<NaiveDate> {
    let days = u64::try_from(request.timeline_days?).ok()?;
    request
        .created_at
        .date_naive()
        .checked_add_days(Days::new(days))
}

/// Validate an hour value used as a target or a progress delta
pub fn is_valid_hours(hours: f64) -> bool {
    hours.is_finite() && hours > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRequest;
    use chrono::TimeZone;

    fn request_with_days(days: Option<i64>) -> PrayerRequest {
        let mut request = NewRequest::new("Exam").into_request().unwrap();
        request.created_at = Utc.with_ymd_and_hms(2024, 3, 10, 18, 30, 0).unwrap();
        request.timeline_days = days;
        request
    }

    #[test]
    fn test_deadline_from_timeline() {
        let request = request_with_days(Some(3));
        assert_eq!(
            deadline_for(&request),
            NaiveDate::from_ymd_opt(2024, 3, 13)
        );
    }

    #[test]
    fn test_no_timeline_no_deadline() {
        assert!(deadline_for(&request_with_days(None)).is_none());
    }

    #[test]
    fn test_new_commitment_pending() {
        let request = request_with_days(Some(1));
        let commitment = Commitment::new(&request, Uuid::new_v4(), DEFAULT_TARGET_HOURS);
        assert_eq!(commitment.state(), CommitmentState::Pending);
        assert!(!commitment.completed);
        assert!(commitment.is_consistent());
        assert_eq!(commitment.remaining_hours(), 4.0);
    }

    #[test]
    fn test_state_threshold_inclusive() {
        assert_eq!(CommitmentState::from_progress(4.0, 4.0), CommitmentState::Completed);
        assert_eq!(CommitmentState::from_progress(3.99, 4.0), CommitmentState::Pending);
    }

    #[test]
    fn test_hours_validation() {
        assert!(is_valid_hours(0.25));
        assert!(!is_valid_hours(0.0));
        assert!(!is_valid_hours(-1.0));
        assert!(!is_valid_hours(f64::NAN));
        assert!(!is_valid_hours(f64::INFINITY));
    }
}
