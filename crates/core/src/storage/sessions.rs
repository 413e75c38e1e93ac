//! Session log storage operations
//!
//! The log is append-only. Appending a session and crediting its hours to
//! the commitment happen in one `BEGIN IMMEDIATE` transaction.

use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::commitments::{ensure_holder, CommitmentStore};
use super::parse::{format_datetime, parse_datetime, parse_uuid};
use crate::error::{Error, Result};
use crate::models::{validate_minutes, Commitment, SessionLogEntry};

const SESSION_COLUMNS: &str =
    "id, commitment_id, volunteer_id, request_id, duration_minutes, note, created_at";

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionLogEntry> {
    Ok(SessionLogEntry {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        commitment_id: parse_uuid(&row.get::<_, String>(1)?)?,
        volunteer_id: parse_uuid(&row.get::<_, String>(2)?)?,
        request_id: parse_uuid(&row.get::<_, String>(3)?)?,
        duration_minutes: row.get(4)?,
        note: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?)?,
    })
}

pub struct SessionLogStore<'a> {
    conn: &'a Connection,
}

impl<'a> SessionLogStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Log a prayer session and credit it to its commitment.
    ///
    /// The entry is attributed to the commitment's current volunteer. With
    /// `expected_volunteer` set, the append is refused unless that volunteer
    /// still holds the commitment when the transaction starts.
    #[instrument(skip(self, note))]
    pub fn append(
        &self,
        commitment_id: Uuid,
        expected_volunteer: Option<Uuid>,
        duration_minutes: u32,
        note: Option<String>,
    ) -> Result<(SessionLogEntry, Commitment)> {
        validate_minutes(duration_minutes)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let ledger = CommitmentStore::new(&tx);

        let commitment = ledger
            .find_by_id(commitment_id)?
            .ok_or_else(|| Error::NotFound(format!("commitment {}", commitment_id)))?;
        ensure_holder(&commitment, expected_volunteer)?;

        let entry = SessionLogEntry::new(
            commitment.id,
            commitment.volunteer_id,
            commitment.request_id,
            duration_minutes,
            note,
        )?;

        tx.execute(
            "INSERT INTO session_log (id, commitment_id, volunteer_id, request_id, duration_minutes, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id.to_string(),
                entry.commitment_id.to_string(),
                entry.volunteer_id.to_string(),
                entry.request_id.to_string(),
                entry.duration_minutes,
                entry.note,
                format_datetime(&entry.created_at),
            ],
        )?;

        let updated = ledger
            .apply_progress(commitment.id, entry.hours())?
            .ok_or_else(|| Error::NotFound(format!("commitment {}", commitment_id)))?;

        tx.commit()?;
        debug!(entry_id = %entry.id, hours = updated.accumulated_hours, "Session logged");

        Ok((entry, updated))
    }

    /// Sessions logged against a request, oldest first
    #[instrument(skip(self))]
    pub fn list_for_request(&self, request_id: Uuid) -> Result<Vec<SessionLogEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM session_log
             WHERE request_id = ?1
             ORDER BY created_at ASC, rowid ASC"
        ))?;

        let entries = stmt
            .query_map(params![request_id.to_string()], session_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Sessions logged against one commitment, oldest first
    #[instrument(skip(self))]
    pub fn list_for_commitment(&self, commitment_id: Uuid) -> Result<Vec<SessionLogEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM session_log
             WHERE commitment_id = ?1
             ORDER BY created_at ASC, rowid ASC"
        ))?;

        let entries = stmt
            .query_map(params![commitment_id.to_string()], session_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRequest;
    use crate::storage::Database;
    use std::thread;

    fn fresh_commitment(db: &Database, target_hours: f64) -> Commitment {
        let request = NewRequest::new("Healing for my father")
            .into_request()
            .unwrap();
        db.requests().create(&request).unwrap();
        db.commitments()
            .commit_to(request.id, Uuid::new_v4(), target_hours)
            .unwrap()
    }

    #[test]
    fn test_sessions_accumulate_to_completion() {
        let db = Database::open_in_memory().unwrap();
        let commitment = fresh_commitment(&db, 4.0);

        for minutes in [60, 60, 90] {
            db.sessions().append(commitment.id, None, minutes, None).unwrap();
        }
        let current = db.commitments().find_by_id(commitment.id).unwrap().unwrap();
        assert_eq!(current.accumulated_hours, 3.5);
        assert!(!current.completed);

        let (entry, updated) = db
            .sessions()
            .append(commitment.id, None, 45, Some("Prayed with the family".into()))
            .unwrap();
        assert_eq!(entry.duration_minutes, 45);
        assert_eq!(entry.volunteer_id, commitment.volunteer_id);
        assert_eq!(updated.accumulated_hours, 4.25);
        assert!(updated.completed);

        let log = db.sessions().list_for_commitment(commitment.id).unwrap();
        let minutes: Vec<u32> = log.iter().map(|e| e.duration_minutes).collect();
        assert_eq!(minutes, vec![60, 60, 90, 45]);
        assert_eq!(log[3].note.as_deref(), Some("Prayed with the family"));
    }

    #[test]
    fn test_zero_minutes_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let commitment = fresh_commitment(&db, 4.0);

        let err = db.sessions().append(commitment.id, None, 0, None).unwrap_err();
        assert!(matches!(err, Error::InvalidDuration(_)));
        assert!(db
            .sessions()
            .list_for_request(commitment.request_id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_append_to_missing_commitment() {
        let db = Database::open_in_memory().unwrap();
        let err = db.sessions().append(Uuid::new_v4(), None, 30, None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_append_checks_holder_inside_transaction() {
        let db = Database::open_in_memory().unwrap();
        let commitment = fresh_commitment(&db, 4.0);

        let err = db
            .sessions()
            .append(commitment.id, Some(Uuid::new_v4()), 60, None)
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));
        let current = db.commitments().find_by_id(commitment.id).unwrap().unwrap();
        assert_eq!(current.accumulated_hours, 0.0);
        assert!(db
            .sessions()
            .list_for_commitment(commitment.id)
            .unwrap()
            .is_empty());

        let (entry, _) = db
            .sessions()
            .append(commitment.id, Some(commitment.volunteer_id), 60, None)
            .unwrap();
        assert_eq!(entry.volunteer_id, commitment.volunteer_id);
    }

    #[test]
    fn test_list_for_request_spans_commitments() {
        let db = Database::open_in_memory().unwrap();
        let first = fresh_commitment(&db, 4.0);
        let second = db
            .commitments()
            .commit_to(first.request_id, Uuid::new_v4(), 4.0)
            .unwrap();

        db.sessions().append(first.id, None, 15, None).unwrap();
        db.sessions().append(second.id, None, 30, None).unwrap();

        let entries = db.sessions().list_for_request(first.request_id).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].commitment_id, first.id);
        assert_eq!(entries[1].commitment_id, second.id);
    }

    #[test]
    fn test_concurrent_appends_lose_no_updates() {
        const WRITERS: usize = 8;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil.db");

        let commitment = {
            let db = Database::open(&path).unwrap();
            fresh_commitment(&db, 4.0)
        };

        let handles: Vec<_> = (0..WRITERS)
            .map(|_| {
                let path = path.clone();
                thread::spawn(move || {
                    let db = Database::open(&path).unwrap();
                    db.sessions().append(commitment.id, None, 60, None).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let db = Database::open(&path).unwrap();
        let current = db.commitments().find_by_id(commitment.id).unwrap().unwrap();
        assert_eq!(current.accumulated_hours, WRITERS as f64);
        assert!(current.completed);
        assert_eq!(
            db.sessions().list_for_commitment(commitment.id).unwrap().len(),
            WRITERS
        );
    }
}
