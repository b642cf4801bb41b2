//! Error type for `stride-upstream`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{service} returned {status}: {body}")]
  Status {
    service: &'static str,
    status:  reqwest::StatusCode,
    body:    String,
  },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("jwt error: {0}")]
  Jwt(#[from] jsonwebtoken::errors::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unexpected response: {0}")]
  UnexpectedResponse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
