//! Read-only aggregate queries for the leader dashboard

use rusqlite::{params, Connection};
use tracing::instrument;

use super::requests::RequestStore;
use crate::error::Result;
use crate::models::{PrayerStats, RequestFilter, RequestStatus, RequestSummary};

pub struct StatsStore<'a> {
    conn: &'a Connection,
}

impl<'a> StatsStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Headline totals across every request
    #[instrument(skip(self))]
    pub fn prayer_stats(&self) -> Result<PrayerStats> {
        let (total_requests, answered_requests): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(status = ?1), 0) FROM requests",
            params![RequestStatus::Answered.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let total_minutes: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(duration_minutes), 0) FROM session_log",
            [],
            |row| row.get(0),
        )?;

        let active_warriors: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT volunteer_id) FROM commitments",
            [],
            |row| row.get(0),
        )?;

        Ok(PrayerStats {
            total_requests: total_requests as u64,
            answered_requests: answered_requests as u64,
            total_hours: total_minutes as f64 / 60.0,
            active_warriors: active_warriors as u64,
        })
    }

    /// Requests with their warrior count and logged hours, newest first
    #[instrument(skip(self))]
    pub fn request_summaries(&self, filter: RequestFilter) -> Result<Vec<RequestSummary>> {
        let requests = RequestStore::new(self.conn).list(filter)?;

        let mut warriors_stmt = self
            .conn
            .prepare("SELECT COUNT(*) FROM commitments WHERE request_id = ?1")?;
        let mut minutes_stmt = self.conn.prepare(
            "SELECT COALESCE(SUM(duration_minutes), 0) FROM session_log WHERE request_id = ?1",
        )?;

        let mut summaries = Vec::with_capacity(requests.len());
        for request in requests {
            let id = request.id.to_string();
            let warriors: i64 = warriors_stmt.query_row(params![id], |row| row.get(0))?;
            let minutes: i64 = minutes_stmt.query_row(params![id], |row| row.get(0))?;
            summaries.push(RequestSummary {
                request,
                warriors_count: warriors as u64,
                total_hours: minutes as f64 / 60.0,
            });
        }

        Ok(summaries)
    }
}
