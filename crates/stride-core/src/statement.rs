//! Identity statements — a user's free-text self-description.
//!
//! Saving a statement never discards the previous one: it moves into the
//! history together with the time it was set. History only ever grows.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on a statement, in characters.
pub const MAX_STATEMENT_CHARS: usize = 1000;

/// A statement that was current until it was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementEntry {
  pub statement: String,
  pub set_at:    DateTime<Utc>,
}

/// The `identities` document for one user (document id = user id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityStatement {
  pub statement: String,
  pub set_at:    DateTime<Utc>,
  /// Prior statements, oldest first.
  #[serde(default)]
  pub history:   Vec<StatementEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatementError {
  #[error("Statement is required")]
  Empty,
  #[error("Statement must be at most 1000 characters")]
  TooLong,
}

/// Validate and trim a candidate statement.
pub fn clean(input: &str) -> Result<&str, StatementError> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(StatementError::Empty);
  }
  if trimmed.chars().count() > MAX_STATEMENT_CHARS {
    return Err(StatementError::TooLong);
  }
  Ok(trimmed)
}

/// Apply a save of `input` on top of `existing`.
pub fn save(
  existing: Option<IdentityStatement>,
  input: &str,
  now: DateTime<Utc>,
) -> Result<IdentityStatement, StatementError> {
  let statement = clean(input)?.to_owned();
  let history = match existing {
    Some(prev) => {
      let mut history = prev.history;
      history.push(StatementEntry {
        statement: prev.statement,
        set_at:    prev.set_at,
      });
      history
    }
    None => Vec::new(),
  };
  Ok(IdentityStatement { statement, set_at: now, history })
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// The outcome of asking whether a text reads as an identity statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
  pub valid:    bool,
  pub feedback: String,
}

/// A judge for identity statements, typically backed by an LLM.
pub trait StatementValidator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn validate<'a>(
    &'a self,
    statement: &'a str,
  ) -> impl Future<Output = Result<Verdict, Self::Error>> + Send + 'a;
}
