//! Request registry operations

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::PrayerTracker;
use crate::error::{Error, Result};
use crate::invariants::assert_request_invariants;
use crate::models::{Actor, DeletionReport, NewRequest, PrayerRequest, RequestFilter};
use crate::permissions::{PermissionMatrix, PrayerAction};
use crate::storage::Storage;

impl<'a, S: Storage> PrayerTracker<'a, S> {
    /// Validate and store a new active request.
    ///
    /// The timeline day offset must already be resolved; submission never
    /// waits on the text-completion service.
    #[instrument(skip(self, submission), fields(actor = %actor.id))]
    pub fn submit(&self, actor: &Actor, submission: NewRequest) -> Result<PrayerRequest> {
        PermissionMatrix::require(actor, PrayerAction::SubmitRequest)?;

        let request = submission.into_request()?;
        self.store
            .create_request(&request)
            .map_err(|e| e.during("submit request"))?;
        assert_request_invariants(&request);

        info!(request_id = %request.id, category = %request.category, "Prayer request submitted");
        Ok(request)
    }

    /// Active requests, newest first
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn list_active(&self, actor: &Actor) -> Result<Vec<PrayerRequest>> {
        PermissionMatrix::require(actor, PrayerAction::ViewActiveRequests)?;
        self.store
            .list_requests(RequestFilter::Active)
            .map_err(|e| e.during("list active requests"))
    }

    /// Requests of any status for the leader view
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn list_requests(&self, actor: &Actor, filter: RequestFilter) -> Result<Vec<PrayerRequest>> {
        let action = match filter {
            RequestFilter::Active => PrayerAction::ViewActiveRequests,
            RequestFilter::All | RequestFilter::Answered => PrayerAction::ViewAllRequests,
        };
        PermissionMatrix::require(actor, action)?;
        self.store
            .list_requests(filter)
            .map_err(|e| e.during("list requests"))
    }

    /// Active requests the actor has not yet committed to
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn available_for(&self, actor: &Actor) -> Result<Vec<PrayerRequest>> {
        PermissionMatrix::require(actor, PrayerAction::ViewActiveRequests)?;
        self.store
            .list_available_requests(actor.id)
            .map_err(|e| e.during("list available requests"))
    }

    /// Look up a single request
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn request(&self, actor: &Actor, id: Uuid) -> Result<PrayerRequest> {
        PermissionMatrix::require(actor, PrayerAction::ViewActiveRequests)?;
        let request = self.find_request(id, "find request")?;
        if !request.is_active() {
            PermissionMatrix::require(actor, PrayerAction::ViewAllRequests)?;
        }
        Ok(request)
    }

    /// Mark a request answered. Repeating the call is a no-op.
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn mark_answered(&self, actor: &Actor, id: Uuid) -> Result<PrayerRequest> {
        PermissionMatrix::require(actor, PrayerAction::MarkAnswered)?;
        self.find_request(id, "mark answered")?;

        let changed = self
            .store
            .mark_request_answered(id, Utc::now())
            .map_err(|e| e.during("mark answered"))?;
        if changed {
            info!(request_id = %id, "Prayer request answered");
        } else {
            debug!(request_id = %id, "Prayer request already answered");
        }

        let request = self.find_request(id, "mark answered")?;
        assert_request_invariants(&request);
        Ok(request)
    }

    /// Delete a request with its commitments and session log
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn delete(&self, actor: &Actor, id: Uuid) -> Result<DeletionReport> {
        PermissionMatrix::require(actor, PrayerAction::DeleteRequest)?;

        let report = self
            .store
            .delete_request(id)
            .map_err(|e| e.during("delete request"))?
            .ok_or_else(|| Error::NotFound(format!("prayer request {}", id)))?;

        info!(
            request_id = %id,
            commitments = report.commitments_removed,
            sessions = report.sessions_removed,
            "Prayer request deleted"
        );
        Ok(report)
    }

    pub(super) fn find_request(&self, id: Uuid, operation: &'static str) -> Result<PrayerRequest> {
        self.store
            .find_request(id)
            .map_err(|e| e.during(operation))?
            .ok_or_else(|| Error::NotFound(format!("prayer request {}", id)))
    }
}
