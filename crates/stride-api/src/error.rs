//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Client errors carry a message shown to the caller verbatim. Server errors
//! are logged in full and answered with a fixed message.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use stride_core::{poll::AddOptionError, statement::StatementError};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("upstream error: {0}")]
  Upstream(#[source] BoxError),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn upstream(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Upstream(Box::new(e))
  }
}

impl From<AddOptionError> for ApiError {
  fn from(e: AddOptionError) -> Self {
    match e {
      AddOptionError::NotAllowed => Self::Forbidden(e.to_string()),
      AddOptionError::Closed
      | AddOptionError::Expired
      | AddOptionError::Duplicate => Self::BadRequest(e.to_string()),
    }
  }
}

impl From<StatementError> for ApiError {
  fn from(e: StatementError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<stride_core::Error> for ApiError {
  fn from(e: stride_core::Error) -> Self { Self::Internal(e.to_string()) }
}

impl From<serde_json::Error> for ApiError {
  fn from(e: serde_json::Error) -> Self { Self::Internal(e.to_string()) }
}

impl From<JsonRejection> for ApiError {
  fn from(e: JsonRejection) -> Self { Self::BadRequest(e.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned())
      }
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(_) | ApiError::Upstream(_) | ApiError::Internal(_) => {
        tracing::error!(error = %self, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "Internal server error".to_owned(),
        )
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
