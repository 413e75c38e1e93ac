//! Commitment ledger operations

use tracing::{info, instrument};
use uuid::Uuid;

use super::PrayerTracker;
use crate::error::{Error, Result};
use crate::invariants::{assert_commitment_invariants, assert_volunteer_id_valid};
use crate::models::{is_valid_hours, Actor, Commitment};
use crate::permissions::{PermissionMatrix, PrayerAction};
use crate::storage::Storage;

impl<'a, S: Storage> PrayerTracker<'a, S> {
    /// Pledge the actor to pray for an active request
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn commit(&self, actor: &Actor, request_id: Uuid) -> Result<Commitment> {
        PermissionMatrix::require(actor, PrayerAction::Commit)?;
        assert_volunteer_id_valid(actor.id, "commit");

        let commitment = self
            .store
            .commit_to_request(request_id, actor.id, self.ledger.default_target_hours)
            .map_err(|e| e.during("commit"))?;
        assert_commitment_invariants(&commitment);

        info!(
            commitment_id = %commitment.id,
            request_id = %request_id,
            target_hours = commitment.target_hours,
            "Commitment created"
        );
        Ok(commitment)
    }

    /// Credit hours directly to a commitment
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn record_progress(
        &self,
        actor: &Actor,
        commitment_id: Uuid,
        delta_hours: f64,
    ) -> Result<Commitment> {
        PermissionMatrix::require(actor, PrayerAction::LogSession)?;
        if !is_valid_hours(delta_hours) {
            return Err(Error::InvalidDuration(format!(
                "progress must be a positive number of hours, got {}",
                delta_hours
            )));
        }

        let current = self.find_commitment(commitment_id, "record progress")?;
        PermissionMatrix::require_owner_or_leader(
            actor,
            current.volunteer_id,
            PrayerAction::LogSession,
        )?;

        let updated = self
            .store
            .record_commitment_progress(commitment_id, actor.holder_guard(), delta_hours)
            .map_err(|e| e.during("record progress"))?
            .ok_or_else(|| Error::NotFound(format!("commitment {}", commitment_id)))?;
        assert_commitment_invariants(&updated);

        if updated.completed && !current.completed {
            info!(commitment_id = %updated.id, hours = updated.accumulated_hours, "Commitment completed");
        }
        Ok(updated)
    }

    /// Move a commitment to another volunteer under the configured progress policy
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn reassign(
        &self,
        actor: &Actor,
        commitment_id: Uuid,
        new_volunteer_id: Uuid,
    ) -> Result<Commitment> {
        PermissionMatrix::require(actor, PrayerAction::ReassignCommitment)?;
        assert_volunteer_id_valid(new_volunteer_id, "reassign");

        let policy = self.ledger.reassign_progress;
        let updated = self
            .store
            .reassign_commitment(commitment_id, new_volunteer_id, policy)
            .map_err(|e| e.during("reassign"))?
            .ok_or_else(|| Error::NotFound(format!("commitment {}", commitment_id)))?;
        assert_commitment_invariants(&updated);

        info!(
            commitment_id = %commitment_id,
            volunteer_id = %new_volunteer_id,
            ?policy,
            "Commitment reassigned"
        );
        Ok(updated)
    }

    /// Change a commitment's target; completion is recomputed
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn set_target_hours(
        &self,
        actor: &Actor,
        commitment_id: Uuid,
        target_hours: f64,
    ) -> Result<Commitment> {
        PermissionMatrix::require(actor, PrayerAction::EditTarget)?;
        if !is_valid_hours(target_hours) {
            return Err(Error::InvalidInput(format!(
                "target must be a positive number of hours, got {}",
                target_hours
            )));
        }

        let updated = self
            .store
            .set_commitment_target(commitment_id, target_hours)
            .map_err(|e| e.during("set target"))?
            .ok_or_else(|| Error::NotFound(format!("commitment {}", commitment_id)))?;
        assert_commitment_invariants(&updated);
        Ok(updated)
    }

    /// A volunteer's commitments, soonest deadline first
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn commitments_for_volunteer(
        &self,
        actor: &Actor,
        volunteer_id: Uuid,
        include_completed: bool,
    ) -> Result<Vec<Commitment>> {
        let action = if volunteer_id == actor.id {
            PrayerAction::ViewOwnCommitments
        } else {
            PrayerAction::ViewOthersCommitments
        };
        PermissionMatrix::require(actor, action)?;

        self.store
            .list_volunteer_commitments(volunteer_id, include_completed)
            .map_err(|e| e.during("list volunteer commitments"))
    }

    /// Every commitment made for a request
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn commitments_for_request(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> Result<Vec<Commitment>> {
        PermissionMatrix::require(actor, PrayerAction::ViewOthersCommitments)?;
        self.find_request(request_id, "list request commitments")?;

        self.store
            .list_request_commitments(request_id)
            .map_err(|e| e.during("list request commitments"))
    }

    pub(super) fn find_commitment(
        &self,
        id: Uuid,
        operation: &'static str,
    ) -> Result<Commitment> {
        self.store
            .find_commitment(id)
            .map_err(|e| e.during(operation))?
            .ok_or_else(|| Error::NotFound(format!("commitment {}", id)))
    }
}
