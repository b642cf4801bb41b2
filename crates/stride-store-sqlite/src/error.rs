//! Error type for `stride-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("stored document {0} is not a JSON object")]
  NotAnObject(String),

  #[error("stored document {0} has invalid version {1}")]
  InvalidVersion(String, i64),

  #[error("upsert of {0} returned no row")]
  UpsertReturnedNothing(String),

  /// Query field names are restricted to `[A-Za-z0-9_]`.
  #[error("invalid field name: {0:?}")]
  InvalidField(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
