//! Prayer fulfillment tracker
//!
//! The tracker is the actor-aware entry point to the request registry, the
//! commitment ledger, the session log and the dashboard aggregates. Every
//! operation takes an explicit [`Actor`](crate::models::Actor), checks it
//! against the [`PermissionMatrix`](crate::permissions::PermissionMatrix)
//! and then delegates to a [`Storage`] backend.

mod dashboard;
mod ledger;
mod registry;
mod session_log;

use crate::config::LedgerConfig;
use crate::storage::Storage;

/// Actor-aware facade over a storage backend
pub struct PrayerTracker<'a, S: Storage> {
    store: &'a S,
    ledger: LedgerConfig,
}

impl<'a, S: Storage> PrayerTracker<'a, S> {
    pub fn new(store: &'a S, ledger: LedgerConfig) -> Self {
        Self { store, ledger }
    }

    /// Tracker with default ledger policy
    pub fn with_defaults(store: &'a S) -> Self {
        Self::new(store, LedgerConfig::default())
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        self.ledger
    }
}
