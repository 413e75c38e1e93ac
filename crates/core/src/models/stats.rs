//! Dashboard aggregate models

use serde::{Deserialize, Serialize};

use super::PrayerRequest;

/// Headline numbers for the leader dashboard
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrayerStats {
    pub total_requests: u64,
    pub answered_requests: u64,
    pub total_hours: f64,
    /// Distinct volunteers holding at least one commitment
    pub active_warriors: u64,
}

/// A request with its prayer coverage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSummary {
    pub request: PrayerRequest,
    pub warriors_count: u64,
    pub total_hours: f64,
}

/// Rows removed by a cascading request delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeletionReport {
    pub commitments_removed: u64,
    pub sessions_removed: u64,
}
