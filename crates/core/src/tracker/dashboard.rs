//! Leader dashboard aggregates

use tracing::instrument;

use super::PrayerTracker;
use crate::error::Result;
use crate::models::{Actor, PrayerStats, RequestFilter, RequestSummary};
use crate::permissions::{PermissionMatrix, PrayerAction};
use crate::storage::Storage;

impl<'a, S: Storage> PrayerTracker<'a, S> {
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn stats(&self, actor: &Actor) -> Result<PrayerStats> {
        PermissionMatrix::require(actor, PrayerAction::ViewDashboard)?;
        self.store
            .prayer_stats()
            .map_err(|e| e.during("prayer stats"))
    }

    #[instrument(skip(self), fields(actor = %actor.id))]
    pub fn request_summaries(
        &self,
        actor: &Actor,
        filter: RequestFilter,
    ) -> Result<Vec<RequestSummary>> {
        PermissionMatrix::require(actor, PrayerAction::ViewDashboard)?;
        self.store
            .request_summaries(filter)
            .map_err(|e| e.during("request summaries"))
    }
}
