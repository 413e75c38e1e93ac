//! Storage repository traits
//!
//! These traits define the storage interface the tracker is written
//! against, so alternative backends can stand in for SQLite.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Commitment, DeletionReport, PrayerRequest, PrayerStats, ReassignProgress, RequestFilter,
    RequestSummary, SessionLogEntry,
};

/// Request registry operations
pub trait RequestRepository {
    /// Persist a new request
    fn create_request(&self, request: &PrayerRequest) -> Result<()>;

    /// Find request by ID
    fn find_request(&self, id: Uuid) -> Result<Option<PrayerRequest>>;

    /// List requests matching a status filter, newest first
    fn list_requests(&self, filter: RequestFilter) -> Result<Vec<PrayerRequest>>;

    /// Active requests the volunteer has not committed to
    fn list_available_requests(&self, volunteer_id: Uuid) -> Result<Vec<PrayerRequest>>;

    /// Mark answered; false if it already was
    fn mark_request_answered(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;

    /// Delete a request and everything that depends on it
    fn delete_request(&self, id: Uuid) -> Result<Option<DeletionReport>>;
}

/// Commitment ledger operations
pub trait CommitmentRepository {
    /// Check-and-insert a commitment for an active request
    fn commit_to_request(
        &self,
        request_id: Uuid,
        volunteer_id: Uuid,
        target_hours: f64,
    ) -> Result<Commitment>;

    /// Find commitment by ID
    fn find_commitment(&self, id: Uuid) -> Result<Option<Commitment>>;

    /// Atomically add hours, refused if `expected_volunteer` no longer holds it
    fn record_commitment_progress(
        &self,
        id: Uuid,
        expected_volunteer: Option<Uuid>,
        delta_hours: f64,
    ) -> Result<Option<Commitment>>;

    /// Move a commitment to another volunteer
    fn reassign_commitment(
        &self,
        id: Uuid,
        new_volunteer_id: Uuid,
        progress: ReassignProgress,
    ) -> Result<Option<Commitment>>;

    /// Change the target hours
    fn set_commitment_target(&self, id: Uuid, target_hours: f64) -> Result<Option<Commitment>>;

    /// A volunteer's commitments by deadline
    fn list_volunteer_commitments(
        &self,
        volunteer_id: Uuid,
        include_completed: bool,
    ) -> Result<Vec<Commitment>>;

    /// Every commitment for a request
    fn list_request_commitments(&self, request_id: Uuid) -> Result<Vec<Commitment>>;
}

/// Session log operations
pub trait SessionLogRepository {
    /// Append a session and credit its commitment, refused if
    /// `expected_volunteer` no longer holds it
    fn append_session(
        &self,
        commitment_id: Uuid,
        expected_volunteer: Option<Uuid>,
        duration_minutes: u32,
        note: Option<String>,
    ) -> Result<(SessionLogEntry, Commitment)>;

    /// Sessions for a request, oldest first
    fn list_request_sessions(&self, request_id: Uuid) -> Result<Vec<SessionLogEntry>>;

    /// Sessions for a commitment, oldest first
    fn list_commitment_sessions(&self, commitment_id: Uuid) -> Result<Vec<SessionLogEntry>>;
}

/// Dashboard aggregate queries
pub trait StatsRepository {
    fn prayer_stats(&self) -> Result<PrayerStats>;

    fn request_summaries(&self, filter: RequestFilter) -> Result<Vec<RequestSummary>>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
pub trait Storage:
    RequestRepository + CommitmentRepository + SessionLogRepository + StatsRepository
{
}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where
    T: RequestRepository + CommitmentRepository + SessionLogRepository + StatsRepository
{
}
