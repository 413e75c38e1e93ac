//! Database value parsing utilities
//!
//! Provides error-safe parsing of stored values.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Error as SqlError;
use uuid::Uuid;

use crate::models::{PrivacyLevel, RequestStatus};

/// Stored date format for commitment deadlines
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn conversion_error<E>(column: usize, e: E) -> SqlError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SqlError::FromSqlConversionFailure(column, Type::Text, Box::new(e))
}

/// Parse a UUID from a database string column
pub fn parse_uuid(s: &str) -> Result<Uuid, SqlError> {
    Uuid::parse_str(s).map_err(|e| conversion_error(0, e))
}

/// Parse a DateTime from an RFC3339 string
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SqlError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(0, e))
}

/// Format a timestamp for storage; fixed width so text order is time order
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an optional DateTime from an RFC3339 string
pub fn parse_datetime_opt(s: Option<String>) -> Result<Option<DateTime<Utc>>, SqlError> {
    s.map(|s| parse_datetime(&s)).transpose()
}

/// Parse an optional calendar date
pub fn parse_date_opt(s: Option<String>) -> Result<Option<NaiveDate>, SqlError> {
    s.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(0, e)))
        .transpose()
}

/// Format an optional calendar date for storage
pub fn format_date_opt(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

/// Parse a stored privacy level
pub fn parse_privacy(s: &str) -> Result<PrivacyLevel, SqlError> {
    s.parse::<PrivacyLevel>().map_err(|e| conversion_error(0, e))
}

/// Parse a stored request status
pub fn parse_status(s: &str) -> Result<RequestStatus, SqlError> {
    RequestStatus::from_str(s).ok_or_else(|| {
        SqlError::FromSqlConversionFailure(
            0,
            Type::Text,
            format!("unknown request status '{}'", s).into(),
        )
    })
}

/// Extension trait for converting rusqlite Results to Option
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, SqlError>;
}

impl<T> OptionalExt<T> for Result<T, SqlError> {
    fn optional(self) -> Result<Option<T>, SqlError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(SqlError::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Whether an error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &SqlError) -> bool {
    matches!(
        err,
        SqlError::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
