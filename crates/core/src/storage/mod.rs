//! SQLite storage layer for Vigil

mod commitments;
mod migrations;
mod parse;
mod requests;
mod sessions;
mod stats;
mod traits;

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Commitment, DeletionReport, PrayerRequest, PrayerStats, ReassignProgress, RequestFilter,
    RequestSummary, SessionLogEntry,
};

pub use commitments::CommitmentStore;
pub use migrations::latest_version;
pub use requests::RequestStore;
pub use sessions::SessionLogStore;
pub use stats::StatsStore;
pub use traits::{
    CommitmentRepository, RequestRepository, SessionLogRepository, StatsRepository, Storage,
};

/// Busy timeout used when none is configured
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open or create database, waiting up to `busy_timeout` for competing writers
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open_with<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::configure(conn, busy_timeout)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(conn, DEFAULT_BUSY_TIMEOUT)
    }

    fn configure(conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get request registry store
    pub fn requests(&self) -> RequestStore<'_> {
        RequestStore::new(&self.conn)
    }

    /// Get commitment ledger store
    pub fn commitments(&self) -> CommitmentStore<'_> {
        CommitmentStore::new(&self.conn)
    }

    /// Get session log store
    pub fn sessions(&self) -> SessionLogStore<'_> {
        SessionLogStore::new(&self.conn)
    }

    /// Get dashboard aggregate store
    pub fn stats(&self) -> StatsStore<'_> {
        StatsStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl RequestRepository for Database {
    fn create_request(&self, request: &PrayerRequest) -> Result<()> {
        self.requests().create(request)
    }

    fn find_request(&self, id: Uuid) -> Result<Option<PrayerRequest>> {
        self.requests().find_by_id(id)
    }

    fn list_requests(&self, filter: RequestFilter) -> Result<Vec<PrayerRequest>> {
        self.requests().list(filter)
    }

    fn list_available_requests(&self, volunteer_id: Uuid) -> Result<Vec<PrayerRequest>> {
        self.requests().list_available_for(volunteer_id)
    }

    fn mark_request_answered(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        self.requests().mark_answered(id, at)
    }

    fn delete_request(&self, id: Uuid) -> Result<Option<DeletionReport>> {
        self.requests().delete_cascade(id)
    }
}

impl CommitmentRepository for Database {
    fn commit_to_request(
        &self,
        request_id: Uuid,
        volunteer_id: Uuid,
        target_hours: f64,
    ) -> Result<Commitment> {
        self.commitments()
            .commit_to(request_id, volunteer_id, target_hours)
    }

    fn find_commitment(&self, id: Uuid) -> Result<Option<Commitment>> {
        self.commitments().find_by_id(id)
    }

    fn record_commitment_progress(
        &self,
        id: Uuid,
        expected_volunteer: Option<Uuid>,
        delta_hours: f64,
    ) -> Result<Option<Commitment>> {
        self.commitments()
            .record_progress(id, expected_volunteer, delta_hours)
    }

    fn reassign_commitment(
        &self,
        id: Uuid,
        new_volunteer_id: Uuid,
        progress: ReassignProgress,
    ) -> Result<Option<Commitment>> {
        self.commitments().reassign(id, new_volunteer_id, progress)
    }

    fn set_commitment_target(&self, id: Uuid, target_hours: f64) -> Result<Option<Commitment>> {
        self.commitments().set_target(id, target_hours)
    }

    fn list_volunteer_commitments(
        &self,
        volunteer_id: Uuid,
        include_completed: bool,
    ) -> Result<Vec<Commitment>> {
        self.commitments()
            .list_for_volunteer(volunteer_id, include_completed)
    }

    fn list_request_commitments(&self, request_id: Uuid) -> Result<Vec<Commitment>> {
        self.commitments().list_for_request(request_id)
    }
}

impl SessionLogRepository for Database {
    fn append_session(
        &self,
        commitment_id: Uuid,
        expected_volunteer: Option<Uuid>,
        duration_minutes: u32,
        note: Option<String>,
    ) -> Result<(SessionLogEntry, Commitment)> {
        self.sessions()
            .append(commitment_id, expected_volunteer, duration_minutes, note)
    }

    fn list_request_sessions(&self, request_id: Uuid) -> Result<Vec<SessionLogEntry>> {
        self.sessions().list_for_request(request_id)
    }

    fn list_commitment_sessions(&self, commitment_id: Uuid) -> Result<Vec<SessionLogEntry>> {
        self.sessions().list_for_commitment(commitment_id)
    }
}

impl StatsRepository for Database {
    fn prayer_stats(&self) -> Result<PrayerStats> {
        self.stats().prayer_stats()
    }

    fn request_summaries(&self, filter: RequestFilter) -> Result<Vec<RequestSummary>> {
        self.stats().request_summaries(filter)
    }
}
