//! Error types for `stride-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("document data must be a JSON object")]
  NotAnObject,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
