//! Vigil Core Library
//!
//! Models, roles and permissions, configuration, storage, and the prayer
//! fulfillment tracker for Vigil.

pub mod config;
pub mod error;
pub mod invariants;
pub mod models;
pub mod permissions;
pub mod storage;
pub mod tracker;

pub use config::{AssistSettings, Config, DatabaseConfig, LedgerConfig, LoggingConfig};
pub use error::{Error, Result};
pub use models::*;
pub use permissions::*;
pub use storage::{
    CommitmentRepository, Database, RequestRepository, SessionLogRepository, StatsRepository,
    Storage,
};
pub use tracker::PrayerTracker;
