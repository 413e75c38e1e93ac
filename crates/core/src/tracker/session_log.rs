//! Session log operations

use tracing::{info, instrument};
use uuid::Uuid;

use super::PrayerTracker;
use crate::error::Result;
use crate::invariants::{assert_commitment_invariants, assert_session_matches};
use crate::models::{validate_minutes, Actor, Commitment, SessionLogEntry};
use crate::permissions::{PermissionMatrix, PrayerAction};
use crate::storage::Storage;

impl<'a, S: Storage> PrayerTracker<'a, S> {
    /// Log a prayer session and credit it to the commitment in one step
    #[instrument(skip(self, note), fields(actor = %actor.id))]
    pub fn log_session(
        &self,
        actor: &Actor,
        commitment_id: Uuid,
        duration_minutes: u32,
        note: Option<String>,
    ) -> Result<(SessionLogEntry, Commitment)> {
        PermissionMatrix::require(actor, PrayerAction::LogSession)?;
        validate_minutes(duration_minutes)?;

        let current = self.find_commitment(commitment_id, "log session")?;
        PermissionMatrix::require_owner_or_leader(
            actor,
            current.volunteer_id,
            PrayerAction::LogSession,
        )?;

        let (entry, updated) = self
            .store
            .append_session(commitment_id, actor.holder_guard(), duration_minutes, note)
            .map_err(|e| e.during("log session"))?;
        assert_session_matches(&entry, &updated);
        assert_commitment_invariants(&updated);

        if updated.completed && !current.completed {
            info!(
                commitment_id = %updated.id,
                hours = updated.accumulated_hours,
                "Commitment completed"
            );
        }
        Ok((entry, updated))
    }

    /// Sessions logged for a request, oldest first
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn sessions_for_request(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> Result<Vec<SessionLogEntry>> {
        PermissionMatrix::require(actor, PrayerAction::ViewDashboard)?;
        self.find_request(request_id, "list request sessions")?;

        self.store
            .list_request_sessions(request_id)
            .map_err(|e| e.during("list request sessions"))
    }

    /// Sessions logged against one commitment, oldest first
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn sessions_for_commitment(
        &self,
        actor: &Actor,
        commitment_id: Uuid,
    ) -> Result<Vec<SessionLogEntry>> {
        let commitment = self.find_commitment(commitment_id, "list commitment sessions")?;
        PermissionMatrix::require_owner_or_leader(
            actor,
            commitment.volunteer_id,
            PrayerAction::ViewOwnCommitments,
        )?;

        self.store
            .list_commitment_sessions(commitment_id)
            .map_err(|e| e.during("list commitment sessions"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{leader, submit, warrior, ReassignBeforeWrite};
    use super::*;
    use crate::error::Error;
    use crate::models::SessionPreset;
    use crate::storage::Database;

    #[test]
    fn test_sessions_complete_commitment() {
        let db = Database::open_in_memory().unwrap();
        let tracker = PrayerTracker::with_defaults(&db);
        let warrior = warrior();
        let request = submit(&tracker, "Favour at the embassy");
        let commitment = tracker.commit(&warrior, request.id).unwrap();

        for minutes in [60, 60, 90] {
            tracker
                .log_session(&warrior, commitment.id, minutes, None)
                .unwrap();
        }
        let current = db.commitments().find_by_id(commitment.id).unwrap().unwrap();
        assert_eq!(current.accumulated_hours, 3.5);
        assert!(!current.completed);

        let (_, updated) = tracker
            .log_session(&warrior, commitment.id, SessionPreset::ThreeQuarters.minutes(), None)
            .unwrap();
        assert_eq!(updated.accumulated_hours, 4.25);
        assert!(updated.completed);
    }

    #[test]
    fn test_zero_minutes_rejected() {
        let db = Database::open_in_memory().unwrap();
        let tracker = PrayerTracker::with_defaults(&db);
        let warrior = warrior();
        let request = submit(&tracker, "Comfort");
        let commitment = tracker.commit(&warrior, request.id).unwrap();

        let err = tracker
            .log_session(&warrior, commitment.id, 0, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDuration(_)));
        assert!(tracker
            .sessions_for_commitment(&warrior, commitment.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_only_owner_or_leader_logs() {
        let db = Database::open_in_memory().unwrap();
        let tracker = PrayerTracker::with_defaults(&db);
        let owner = warrior();
        let request = submit(&tracker, "Restoration");
        let commitment = tracker.commit(&owner, request.id).unwrap();

        let err = tracker
            .log_session(&warrior(), commitment.id, 30, None)
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));

        let (entry, _) = tracker
            .log_session(&leader(), commitment.id, 30, Some("covering".into()))
            .unwrap();
        assert_eq!(entry.volunteer_id, owner.id);
    }

    #[test]
    fn test_session_listing_permissions() {
        let db = Database::open_in_memory().unwrap();
        let tracker = PrayerTracker::with_defaults(&db);
        let leader = leader();
        let owner = warrior();
        let request = submit(&tracker, "Protection");
        let commitment = tracker.commit(&owner, request.id).unwrap();
        tracker.log_session(&owner, commitment.id, 15, None).unwrap();

        assert_eq!(
            tracker.sessions_for_request(&leader, request.id).unwrap().len(),
            1
        );
        assert!(matches!(
            tracker.sessions_for_request(&owner, request.id),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            tracker.sessions_for_commitment(&warrior(), commitment.id),
            Err(Error::PermissionDenied(_))
        ));
        assert!(matches!(
            tracker.sessions_for_request(&leader, Uuid::new_v4()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_session_refused_after_commitment_moves() {
        let db = Database::open_in_memory().unwrap();
        let tracker = PrayerTracker::with_defaults(&db);
        let former = warrior();
        let successor = warrior();
        let request = submit(&tracker, "Safe travels");
        let commitment = tracker.commit(&former, request.id).unwrap();

        let racing = ReassignBeforeWrite {
            db: &db,
            to: successor.id,
        };
        let err = PrayerTracker::with_defaults(&racing)
            .log_session(&former, commitment.id, 60, None)
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));

        let current = db.commitments().find_by_id(commitment.id).unwrap().unwrap();
        assert_eq!(current.volunteer_id, successor.id);
        assert_eq!(current.accumulated_hours, 0.0);
        assert!(db
            .sessions()
            .list_for_commitment(commitment.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_leader_session_follows_moved_commitment() {
        let db = Database::open_in_memory().unwrap();
        let tracker = PrayerTracker::with_defaults(&db);
        let successor = warrior();
        let request = submit(&tracker, "Open doors");
        let commitment = tracker.commit(&warrior(), request.id).unwrap();

        let racing = ReassignBeforeWrite {
            db: &db,
            to: successor.id,
        };
        let (entry, updated) = PrayerTracker::with_defaults(&racing)
            .log_session(&leader(), commitment.id, 30, None)
            .unwrap();
        assert_eq!(entry.volunteer_id, successor.id);
        assert_eq!(updated.accumulated_hours, 0.5);
    }
}
