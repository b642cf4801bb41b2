//! Polls and the add-option transition.
//!
//! A poll is a votable, ordered list of options. Participants may append
//! options when the poll's settings allow it; options are never removed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
  pub id:   String,
  pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSettings {
  #[serde(default)]
  pub participants_can_add_options: bool,
  /// After this instant the poll no longer accepts changes.
  pub active_till:                  Option<DateTime<Utc>>,
}

/// The body of a `polls` document. The poll id is the document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
  #[serde(default)]
  pub question:   String,
  #[serde(default)]
  pub options:    Vec<PollOption>,
  /// Vote tally keyed by option id.
  #[serde(default)]
  pub votes:      BTreeMap<String, u64>,
  #[serde(default)]
  pub settings:   PollSettings,
  pub closed_at:  Option<DateTime<Utc>>,
  pub created_by: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

/// Why an option could not be added. The display strings are shown to the
/// caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddOptionError {
  #[error("Adding options is not allowed for this poll")]
  NotAllowed,
  #[error("This poll is closed")]
  Closed,
  #[error("This poll has expired")]
  Expired,
  #[error("This option already exists")]
  Duplicate,
}

/// Comparison key for option text: surrounding whitespace and case ignored.
fn option_key(text: &str) -> String { text.trim().to_lowercase() }

/// Generate an option id from the current time plus a random suffix.
///
/// Collisions are improbable but not excluded; there is no registry of issued
/// ids to check against.
pub fn generate_option_id(now: DateTime<Utc>) -> String {
  let mut suffix = [0u8; 4];
  OsRng.fill_bytes(&mut suffix);
  format!("opt_{}_{}", now.timestamp_millis(), hex::encode(suffix))
}

impl Poll {
  /// Whether the poll accepts changes at `now`.
  pub fn ensure_open(&self, now: DateTime<Utc>) -> Result<(), AddOptionError> {
    if self.closed_at.is_some() {
      return Err(AddOptionError::Closed);
    }
    match self.settings.active_till {
      Some(till) if till <= now => Err(AddOptionError::Expired),
      _ => Ok(()),
    }
  }

  pub fn has_option(&self, text: &str) -> bool {
    let key = option_key(text);
    self.options.iter().any(|o| option_key(&o.text) == key)
  }

  /// Append an option with a zero vote count.
  ///
  /// Checks run in a fixed order, first failure wins: settings permit adding,
  /// poll not closed, poll not expired, text not a duplicate. The caller is
  /// expected to have rejected blank text already; the stored text is trimmed.
  pub fn add_option(
    &mut self,
    text: &str,
    now: DateTime<Utc>,
  ) -> Result<PollOption, AddOptionError> {
    if !self.settings.participants_can_add_options {
      return Err(AddOptionError::NotAllowed);
    }
    self.ensure_open(now)?;
    if self.has_option(text) {
      return Err(AddOptionError::Duplicate);
    }

    let option = PollOption {
      id:   generate_option_id(now),
      text: text.trim().to_owned(),
    };
    self.options.push(option.clone());
    self.votes.insert(option.id.clone(), 0);
    Ok(option)
  }
}
