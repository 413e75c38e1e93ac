//! Commitment ledger storage operations
//!
//! Progress is always applied as a single storage-side increment that
//! recomputes `completed` in the same statement, so readers never observe
//! one field updated without the other.

use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    format_date_opt, format_datetime, is_unique_violation, parse_date_opt, parse_datetime,
    parse_uuid, OptionalExt,
};
use super::requests::RequestStore;
use crate::error::{Error, Result};
use crate::models::{Commitment, ReassignProgress, RequestStatus};

const COMMITMENT_COLUMNS: &str =
    "id, request_id, volunteer_id, target_hours, accumulated_hours, deadline, completed, created_at";

fn commitment_from_row(row: &Row<'_>) -> rusqlite::Result<Commitment> {
    Ok(Commitment {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        request_id: parse_uuid(&row.get::<_, String>(1)?)?,
        volunteer_id: parse_uuid(&row.get::<_, String>(2)?)?,
        target_hours: row.get(3)?,
        accumulated_hours: row.get(4)?,
        deadline: parse_date_opt(row.get::<_, Option<String>>(5)?)?,
        completed: row.get::<_, i32>(6)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(7)?)?,
    })
}

/// Fail unless `expected` is unset or still holds the commitment
pub(crate) fn ensure_holder(commitment: &Commitment, expected: Option<Uuid>) -> Result<()> {
    match expected {
        Some(volunteer_id) if volunteer_id != commitment.volunteer_id => {
            Err(Error::PermissionDenied(format!(
                "commitment {} is no longer held by {}",
                commitment.id, volunteer_id
            )))
        }
        _ => Ok(()),
    }
}

pub struct CommitmentStore<'a> {
    conn: &'a Connection,
}

impl<'a> CommitmentStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a commitment row; the (request, volunteer) pair must be free
    #[instrument(skip(self, commitment), fields(commitment_id = %commitment.id))]
    pub fn insert(&self, commitment: &Commitment) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO commitments (id, request_id, volunteer_id, target_hours, accumulated_hours, deadline, completed, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    commitment.id.to_string(),
                    commitment.request_id.to_string(),
                    commitment.volunteer_id.to_string(),
                    commitment.target_hours,
                    commitment.accumulated_hours,
                    format_date_opt(commitment.deadline),
                    commitment.completed as i32,
                    format_datetime(&commitment.created_at),
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::AlreadyCommitted {
                        request_id: commitment.request_id,
                        volunteer_id: commitment.volunteer_id,
                    }
                } else {
                    Error::Database(e)
                }
            })?;
        Ok(())
    }

    /// Check-and-insert a new commitment in one transaction
    #[instrument(skip(self))]
    pub fn commit_to(
        &self,
        request_id: Uuid,
        volunteer_id: Uuid,
        target_hours: f64,
    ) -> Result<Commitment> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let request = RequestStore::new(&tx)
            .find_by_id(request_id)?
            .ok_or_else(|| Error::NotFound(format!("prayer request {}", request_id)))?;
        if request.status != RequestStatus::Active {
            return Err(Error::RequestNotActive(request_id));
        }

        let ledger = CommitmentStore::new(&tx);
        if ledger.find_for(request_id, volunteer_id)?.is_some() {
            return Err(Error::AlreadyCommitted {
                request_id,
                volunteer_id,
            });
        }

        let commitment = Commitment::new(&request, volunteer_id, target_hours);
        ledger.insert(&commitment)?;
        tx.commit()?;

        Ok(commitment)
    }

    /// Find commitment by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Commitment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMMITMENT_COLUMNS} FROM commitments WHERE id = ?1"
        ))?;

        let commitment = stmt
            .query_row(params![id.to_string()], commitment_from_row)
            .optional()?;

        Ok(commitment)
    }

    /// Find the commitment a volunteer holds for a request
    #[instrument(skip(self))]
    pub fn find_for(&self, request_id: Uuid, volunteer_id: Uuid) -> Result<Option<Commitment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMMITMENT_COLUMNS} FROM commitments WHERE request_id = ?1 AND volunteer_id = ?2"
        ))?;

        let commitment = stmt
            .query_row(
                params![request_id.to_string(), volunteer_id.to_string()],
                commitment_from_row,
            )
            .optional()?;

        Ok(commitment)
    }

    /// Add hours to a commitment without opening a transaction.
    ///
    /// Callers that also write other rows run this inside their own
    /// transaction. Returns `None` if the commitment does not exist.
    pub(crate) fn apply_progress(&self, id: Uuid, delta_hours: f64) -> Result<Option<Commitment>> {
        let changed = self.conn.execute(
            "UPDATE commitments
             SET accumulated_hours = accumulated_hours + ?1,
                 completed = (accumulated_hours + ?1 >= target_hours)
             WHERE id = ?2",
            params![delta_hours, id.to_string()],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        self.find_by_id(id)
    }

    /// Atomically add hours to a commitment.
    ///
    /// With `expected_volunteer` set, the write is refused unless that
    /// volunteer still holds the commitment when the transaction starts.
    #[instrument(skip(self))]
    pub fn record_progress(
        &self,
        id: Uuid,
        expected_volunteer: Option<Uuid>,
        delta_hours: f64,
    ) -> Result<Option<Commitment>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let ledger = CommitmentStore::new(&tx);

        let Some(current) = ledger.find_by_id(id)? else {
            return Ok(None);
        };
        ensure_holder(&current, expected_volunteer)?;

        let updated = ledger.apply_progress(id, delta_hours)?;
        tx.commit()?;
        Ok(updated)
    }

    /// Move a commitment to another volunteer
    #[instrument(skip(self))]
    pub fn reassign(
        &self,
        id: Uuid,
        new_volunteer_id: Uuid,
        progress: ReassignProgress,
    ) -> Result<Option<Commitment>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let ledger = CommitmentStore::new(&tx);

        let Some(current) = ledger.find_by_id(id)? else {
            return Ok(None);
        };

        let result = match progress {
            ReassignProgress::Carry => tx.execute(
                "UPDATE commitments SET volunteer_id = ?1 WHERE id = ?2",
                params![new_volunteer_id.to_string(), id.to_string()],
            ),
            ReassignProgress::Reset => tx.execute(
                "UPDATE commitments
                 SET volunteer_id = ?1,
                     accumulated_hours = 0,
                     completed = (0 >= target_hours)
                 WHERE id = ?2",
                params![new_volunteer_id.to_string(), id.to_string()],
            ),
        };
        result.map_err(|e| {
            if is_unique_violation(&e) {
                Error::AlreadyCommitted {
                    request_id: current.request_id,
                    volunteer_id: new_volunteer_id,
                }
            } else {
                Error::Database(e)
            }
        })?;

        let updated = ledger.find_by_id(id)?;
        tx.commit()?;
        Ok(updated)
    }

    /// Change the target and recompute completion from the stored progress
    #[instrument(skip(self))]
    pub fn set_target(&self, id: Uuid, target_hours: f64) -> Result<Option<Commitment>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE commitments
             SET target_hours = ?1,
                 completed = (accumulated_hours >= ?1)
             WHERE id = ?2",
            params![target_hours, id.to_string()],
        )?;
        let updated = if changed == 0 {
            None
        } else {
            CommitmentStore::new(&tx).find_by_id(id)?
        };
        tx.commit()?;
        Ok(updated)
    }

    /// A volunteer's commitments, soonest deadline first, undated last
    #[instrument(skip(self))]
    pub fn list_for_volunteer(
        &self,
        volunteer_id: Uuid,
        include_completed: bool,
    ) -> Result<Vec<Commitment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMMITMENT_COLUMNS} FROM commitments
             WHERE volunteer_id = ?1 AND (?2 OR completed = 0)
             ORDER BY deadline IS NULL, deadline ASC, created_at ASC"
        ))?;

        let commitments = stmt
            .query_map(
                params![volunteer_id.to_string(), include_completed],
                commitment_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(commitments)
    }

    /// Every commitment for a request, any state
    #[instrument(skip(self))]
    pub fn list_for_request(&self, request_id: Uuid) -> Result<Vec<Commitment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMMITMENT_COLUMNS} FROM commitments
             WHERE request_id = ?1
             ORDER BY created_at ASC, rowid ASC"
        ))?;

        let commitments = stmt
            .query_map(params![request_id.to_string()], commitment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(commitments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewRequest, PrayerRequest, DEFAULT_TARGET_HOURS};
    use crate::storage::Database;
    use chrono::Utc;

    fn create_request(db: &Database, timeline_days: Option<i64>) -> PrayerRequest {
        let request = NewRequest::new("Strength during chemotherapy")
            .with_timeline_days(timeline_days)
            .into_request()
            .unwrap();
        db.requests().create(&request).unwrap();
        request
    }

    #[test]
    fn test_commit_and_find() {
        let db = Database::open_in_memory().unwrap();
        let request = create_request(&db, Some(3));
        let volunteer = Uuid::new_v4();

        let commitment = db
            .commitments()
            .commit_to(request.id, volunteer, DEFAULT_TARGET_HOURS)
            .unwrap();
        assert_eq!(
            commitment.deadline,
            request.created_at.date_naive().checked_add_days(chrono::Days::new(3))
        );

        let found = db.commitments().find_by_id(commitment.id).unwrap().unwrap();
        assert_eq!(found.volunteer_id, volunteer);
        assert_eq!(found.target_hours, 4.0);
        assert_eq!(found.accumulated_hours, 0.0);
        assert_eq!(found.deadline, commitment.deadline);
        assert!(!found.completed);
    }

    #[test]
    fn test_commit_twice_rejected() {
        let db = Database::open_in_memory().unwrap();
        let request = create_request(&db, None);
        let volunteer = Uuid::new_v4();

        db.commitments().commit_to(request.id, volunteer, 4.0).unwrap();
        let err = db.commitments().commit_to(request.id, volunteer, 4.0).unwrap_err();
        assert!(matches!(err, Error::AlreadyCommitted { .. }));
    }

    #[test]
    fn test_unique_constraint_backs_raw_insert() {
        let db = Database::open_in_memory().unwrap();
        let request = create_request(&db, None);
        let volunteer = Uuid::new_v4();

        db.commitments()
            .insert(&Commitment::new(&request, volunteer, 4.0))
            .unwrap();
        let err = db
            .commitments()
            .insert(&Commitment::new(&request, volunteer, 4.0))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyCommitted { .. }));
    }

    #[test]
    fn test_commit_to_answered_rejected() {
        let db = Database::open_in_memory().unwrap();
        let request = create_request(&db, None);
        db.requests().mark_answered(request.id, Utc::now()).unwrap();

        let err = db
            .commitments()
            .commit_to(request.id, Uuid::new_v4(), 4.0)
            .unwrap_err();
        assert!(matches!(err, Error::RequestNotActive(id) if id == request.id));
    }

    #[test]
    fn test_commit_to_missing_request() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .commitments()
            .commit_to(Uuid::new_v4(), Uuid::new_v4(), 4.0)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_progress_flips_completed() {
        let db = Database::open_in_memory().unwrap();
        let request = create_request(&db, None);
        let commitment = db
            .commitments()
            .commit_to(request.id, Uuid::new_v4(), 1.0)
            .unwrap();

        let updated = db
            .commitments()
            .record_progress(commitment.id, None, 0.5)
            .unwrap()
            .unwrap();
        assert_eq!(updated.accumulated_hours, 0.5);
        assert!(!updated.completed);

        let updated = db
            .commitments()
            .record_progress(commitment.id, None, 0.5)
            .unwrap()
            .unwrap();
        assert_eq!(updated.accumulated_hours, 1.0);
        assert!(updated.completed);
    }

    #[test]
    fn test_progress_on_missing_commitment() {
        let db = Database::open_in_memory().unwrap();
        assert!(db
            .commitments()
            .record_progress(Uuid::new_v4(), None, 1.0)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_set_target_recomputes_both_ways() {
        let db = Database::open_in_memory().unwrap();
        let request = create_request(&db, None);
        let commitment = db
            .commitments()
            .commit_to(request.id, Uuid::new_v4(), 4.0)
            .unwrap();
        db.commitments().record_progress(commitment.id, None, 2.0).unwrap();

        let lowered = db.commitments().set_target(commitment.id, 2.0).unwrap().unwrap();
        assert!(lowered.completed);

        let raised = db.commitments().set_target(commitment.id, 3.0).unwrap().unwrap();
        assert!(!raised.completed);
        assert_eq!(raised.accumulated_hours, 2.0);
    }

    #[test]
    fn test_reassign_reset_clears_progress() {
        let db = Database::open_in_memory().unwrap();
        let request = create_request(&db, None);
        let commitment = db
            .commitments()
            .commit_to(request.id, Uuid::new_v4(), 1.0)
            .unwrap();
        db.commitments().record_progress(commitment.id, None, 1.5).unwrap();

        let new_volunteer = Uuid::new_v4();
        let moved = db
            .commitments()
            .reassign(commitment.id, new_volunteer, ReassignProgress::Reset)
            .unwrap()
            .unwrap();
        assert_eq!(moved.volunteer_id, new_volunteer);
        assert_eq!(moved.accumulated_hours, 0.0);
        assert!(!moved.completed);
    }

    #[test]
    fn test_reassign_onto_existing_holder_rejected() {
        let db = Database::open_in_memory().unwrap();
        let request = create_request(&db, None);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let commitment = db.commitments().commit_to(request.id, first, 4.0).unwrap();
        db.commitments().commit_to(request.id, second, 4.0).unwrap();

        let err = db
            .commitments()
            .reassign(commitment.id, second, ReassignProgress::Carry)
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyCommitted { volunteer_id, .. } if volunteer_id == second));

        let unchanged = db.commitments().find_by_id(commitment.id).unwrap().unwrap();
        assert_eq!(unchanged.volunteer_id, first);
    }

    #[test]
    fn test_list_for_volunteer_orders_by_deadline() {
        let db = Database::open_in_memory().unwrap();
        let volunteer = Uuid::new_v4();

        let undated = create_request(&db, None);
        let later = create_request(&db, Some(10));
        let sooner = create_request(&db, Some(2));
        let done = create_request(&db, Some(1));

        let c_undated = db.commitments().commit_to(undated.id, volunteer, 4.0).unwrap();
        let c_later = db.commitments().commit_to(later.id, volunteer, 4.0).unwrap();
        let c_sooner = db.commitments().commit_to(sooner.id, volunteer, 4.0).unwrap();
        let c_done = db.commitments().commit_to(done.id, volunteer, 1.0).unwrap();
        db.commitments().record_progress(c_done.id, None, 1.0).unwrap();

        let open: Vec<_> = db
            .commitments()
            .list_for_volunteer(volunteer, false)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(open, vec![c_sooner.id, c_later.id, c_undated.id]);

        let all: Vec<_> = db
            .commitments()
            .list_for_volunteer(volunteer, true)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(all, vec![c_done.id, c_sooner.id, c_later.id, c_undated.id]);
    }

    #[test]
    fn test_list_for_request() {
        let db = Database::open_in_memory().unwrap();
        let request = create_request(&db, None);
        let other = create_request(&db, None);

        db.commitments().commit_to(request.id, Uuid::new_v4(), 4.0).unwrap();
        db.commitments().commit_to(request.id, Uuid::new_v4(), 4.0).unwrap();
        db.commitments().commit_to(other.id, Uuid::new_v4(), 4.0).unwrap();

        let listed = db.commitments().list_for_request(request.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|c| c.request_id == request.id));
    }
}
