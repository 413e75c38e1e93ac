//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{info, instrument};

use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial prayer tracker schema",
        sql: r#"
            -- Prayer requests
            CREATE TABLE IF NOT EXISTS requests (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                privacy_level TEXT NOT NULL CHECK (privacy_level IN ('public', 'anonymous')),
                requester_name TEXT,
                requester_phone TEXT,
                requester_email TEXT,
                timeline_text TEXT,
                timeline_days INTEGER,
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'answered')),
                created_at TEXT NOT NULL,
                answered_at TEXT,
                CHECK (privacy_level = 'public' OR requester_name IS NULL)
            );

            -- Warrior commitments, one per (request, volunteer)
            CREATE TABLE IF NOT EXISTS commitments (
                id TEXT PRIMARY KEY,
                request_id TEXT NOT NULL,
                volunteer_id TEXT NOT NULL,
                target_hours REAL NOT NULL CHECK (target_hours > 0),
                accumulated_hours REAL NOT NULL DEFAULT 0 CHECK (accumulated_hours >= 0),
                deadline TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (request_id) REFERENCES requests(id),
                UNIQUE(request_id, volunteer_id)
            );

            -- Append-only prayer session log
            CREATE TABLE IF NOT EXISTS session_log (
                id TEXT PRIMARY KEY,
                commitment_id TEXT NOT NULL,
                volunteer_id TEXT NOT NULL,
                request_id TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
                note TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (commitment_id) REFERENCES commitments(id),
                FOREIGN KEY (request_id) REFERENCES requests(id)
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add indexes for query performance",
        sql: r#"
            -- Request indexes
            CREATE INDEX IF NOT EXISTS idx_requests_status_created ON requests(status, created_at);

            -- Commitment indexes
            CREATE INDEX IF NOT EXISTS idx_commitments_volunteer ON commitments(volunteer_id);
            CREATE INDEX IF NOT EXISTS idx_commitments_request ON commitments(request_id);

            -- Session log indexes
            CREATE INDEX IF NOT EXISTS idx_session_log_request ON session_log(request_id);
            CREATE INDEX IF NOT EXISTS idx_session_log_commitment ON session_log(commitment_id);
        "#,
    },
];

/// Initialize the migrations table
fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version
fn get_current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Record that a migration was applied
fn record_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.description,
            chrono::Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Run all pending migrations
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    apply_migrations(conn, MIGRATIONS)
}

/// Apply each pending migration in its own `BEGIN IMMEDIATE` transaction.
///
/// The version is re-read under the write lock, so connections racing on a
/// fresh file apply every step exactly once.
fn apply_migrations(conn: &Connection, migrations: &[Migration]) -> Result<()> {
    init_migrations_table(conn)?;

    let current_version = get_current_version(conn)?;
    info!(current_version, "Checking for pending migrations");

    for migration in migrations {
        if migration.version <= current_version {
            continue;
        }

        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        if migration.version <= get_current_version(&tx)? {
            continue;
        }

        info!(
            version = migration.version,
            description = migration.description,
            "Applying migration"
        );

        tx.execute_batch(migration.sql)?;
        record_migration(&tx, migration)?;
        tx.commit()?;

        info!(version = migration.version, "Migration complete");
    }

    let new_version = get_current_version(conn)?;
    if new_version > current_version {
        info!(
            from = current_version,
            to = new_version,
            "Database schema updated"
        );
    }

    Ok(())
}

/// Latest schema version known to this build
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}
