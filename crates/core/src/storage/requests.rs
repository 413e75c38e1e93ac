//! Prayer request storage operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    format_datetime, parse_datetime, parse_datetime_opt, parse_privacy, parse_status, parse_uuid,
    OptionalExt,
};
use crate::error::Result;
use crate::models::{DeletionReport, PrayerRequest, RequestFilter, RequestStatus};

const REQUEST_COLUMNS: &str = "id, title, description, category, privacy_level, requester_name,
     requester_phone, requester_email, timeline_text, timeline_days, status, created_at, answered_at";

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<PrayerRequest> {
    Ok(PrayerRequest {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        privacy: parse_privacy(&row.get::<_, String>(4)?)?,
        requester_name: row.get(5)?,
        requester_phone: row.get(6)?,
        requester_email: row.get(7)?,
        timeline_text: row.get(8)?,
        timeline_days: row.get(9)?,
        status: parse_status(&row.get::<_, String>(10)?)?,
        created_at: parse_datetime(&row.get::<_, String>(11)?)?,
        answered_at: parse_datetime_opt(row.get::<_, Option<String>>(12)?)?,
    })
}

pub struct RequestStore<'a> {
    conn: &'a Connection,
}

impl<'a> RequestStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new request
    #[instrument(skip(self, request), fields(request_id = %request.id))]
    pub fn create(&self, request: &PrayerRequest) -> Result<()> {
        self.conn.execute(
            "INSERT INTO requests (id, title, description, category, privacy_level, requester_name,
                requester_phone, requester_email, timeline_text, timeline_days, status, created_at, answered_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                request.id.to_string(),
                request.title,
                request.description,
                request.category,
                request.privacy.as_str(),
                request.requester_name,
                request.requester_phone,
                request.requester_email,
                request.timeline_text,
                request.timeline_days,
                request.status.as_str(),
                format_datetime(&request.created_at),
                request.answered_at.as_ref().map(format_datetime),
            ],
        )?;
        Ok(())
    }

    /// Find request by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<PrayerRequest>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?1"))?;

        let request = stmt
            .query_row(params![id.to_string()], request_from_row)
            .optional()?;

        Ok(request)
    }

    /// List requests matching a status filter, newest first
    #[instrument(skip(self))]
    pub fn list(&self, filter: RequestFilter) -> Result<Vec<PrayerRequest>> {
        let requests = match filter.status() {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {REQUEST_COLUMNS} FROM requests WHERE status = ?1
                     ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map(params![status.as_str()], request_from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {REQUEST_COLUMNS} FROM requests ORDER BY created_at DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map([], request_from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(requests)
    }

    /// Active requests the volunteer has not committed to, newest first
    #[instrument(skip(self))]
    pub fn list_available_for(&self, volunteer_id: Uuid) -> Result<Vec<PrayerRequest>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests r
             WHERE r.status = 'active'
               AND NOT EXISTS (
                   SELECT 1 FROM commitments c
                   WHERE c.request_id = r.id AND c.volunteer_id = ?1
               )
             ORDER BY r.created_at DESC, r.rowid DESC"
        ))?;

        let requests = stmt
            .query_map(params![volunteer_id.to_string()], request_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(requests)
    }

    /// Move an active request to answered.
    ///
    /// Returns false when the request was already answered; the original
    /// `answered_at` is kept in that case.
    #[instrument(skip(self))]
    pub fn mark_answered(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE requests SET status = ?1, answered_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![
                RequestStatus::Answered.as_str(),
                format_datetime(&at),
                id.to_string(),
                RequestStatus::Active.as_str(),
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a request together with its commitments and session log.
    ///
    /// Returns `None` if the request does not exist.
    #[instrument(skip(self))]
    pub fn delete_cascade(&self, id: Uuid) -> Result<Option<DeletionReport>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let id_str = id.to_string();

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM requests WHERE id = ?1",
                params![id_str],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Ok(None);
        }

        let sessions_removed = tx.execute(
            "DELETE FROM session_log
             WHERE request_id = ?1
                OR commitment_id IN (SELECT id FROM commitments WHERE request_id = ?1)",
            params![id_str],
        )?;
        let commitments_removed = tx.execute(
            "DELETE FROM commitments WHERE request_id = ?1",
            params![id_str],
        )?;
        tx.execute("DELETE FROM requests WHERE id = ?1", params![id_str])?;
        tx.commit()?;

        Ok(Some(DeletionReport {
            commitments_removed: commitments_removed as u64,
            sessions_removed: sessions_removed as u64,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, NewRequest, PrivacyLevel};
    use crate::storage::Database;
    use chrono::Duration;

    fn make_request(description: &str, age_minutes: i64) -> PrayerRequest {
        let mut request = NewRequest::new(description).into_request().unwrap();
        request.created_at = Utc::now() - Duration::minutes(age_minutes);
        request
    }

    #[test]
    fn test_create_and_find() {
        let db = Database::open_in_memory().unwrap();
        let request = NewRequest::new("Safe delivery for my sister")
            .with_title("Safe delivery")
            .with_category("Family")
            .with_privacy(PrivacyLevel::Public)
            .with_contact(Contact {
                name: Some("Efua".into()),
                phone: Some("+36 1 234 5678".into()),
                email: None,
            })
            .with_timeline("due in two weeks")
            .with_timeline_days(Some(14))
            .into_request()
            .unwrap();
        db.requests().create(&request).unwrap();

        let found = db.requests().find_by_id(request.id).unwrap().unwrap();
        assert_eq!(found.title, "Safe delivery");
        assert_eq!(found.category, "Family");
        assert_eq!(found.requester_name.as_deref(), Some("Efua"));
        assert_eq!(found.timeline_days, Some(14));
        assert_eq!(found.status, RequestStatus::Active);
        assert!(found.answered_at.is_none());
    }

    #[test]
    fn test_find_missing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.requests().find_by_id(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first_with_filter() {
        let db = Database::open_in_memory().unwrap();
        let oldest = make_request("oldest", 30);
        let middle = make_request("middle", 20);
        let newest = make_request("newest", 10);
        for r in [&oldest, &middle, &newest] {
            db.requests().create(r).unwrap();
        }
        db.requests().mark_answered(middle.id, Utc::now()).unwrap();

        let active: Vec<_> = db
            .requests()
            .list(RequestFilter::Active)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(active, vec![newest.id, oldest.id]);

        let answered = db.requests().list(RequestFilter::Answered).unwrap();
        assert_eq!(answered.len(), 1);
        assert_eq!(answered[0].id, middle.id);

        assert_eq!(db.requests().list(RequestFilter::All).unwrap().len(), 3);
    }

    #[test]
    fn test_mark_answered_keeps_first_timestamp() {
        let db = Database::open_in_memory().unwrap();
        let request = make_request("Visa approval", 5);
        db.requests().create(&request).unwrap();

        let first = Utc::now() - Duration::minutes(1);
        assert!(db.requests().mark_answered(request.id, first).unwrap());
        assert!(!db.requests().mark_answered(request.id, Utc::now()).unwrap());

        let found = db.requests().find_by_id(request.id).unwrap().unwrap();
        assert_eq!(found.status, RequestStatus::Answered);
        assert_eq!(
            found.answered_at.map(|t| format_datetime(&t)),
            Some(format_datetime(&first))
        );
    }

    #[test]
    fn test_delete_missing_returns_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.requests().delete_cascade(Uuid::new_v4()).unwrap().is_none());
    }
}
