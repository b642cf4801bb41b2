//! Users as seen by this service: the mirrored user record, the profile
//! fetched on demand from the identity provider, and the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role claim carried by a user. Unknown claims fall back to `Member`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Member,
  Coach,
  Admin,
}

impl Role {
  pub fn from_claim(claim: Option<&str>) -> Self {
    match claim.map(str::trim) {
      Some(c) if c.eq_ignore_ascii_case("coach") => Self::Coach,
      Some(c) if c.eq_ignore_ascii_case("admin") => Self::Admin,
      _ => Self::Member,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Member => "member",
      Self::Coach => "coach",
      Self::Admin => "admin",
    }
  }
}

/// The identity of the caller of a request, resolved from its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
  pub user_id: String,
  pub role:    Role,
}

/// A user profile as held by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub id:        String,
  pub name:      String,
  pub email:     Option<String>,
  pub image_url: Option<String>,
  pub role:      Role,
}

/// The mirrored copy of a user in the `users` collection. The document id is
/// the identity-provider subject id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
  pub name:       String,
  pub email:      Option<String>,
  #[serde(default)]
  pub role:       Role,
  pub image_url:  Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl UserRecord {
  pub fn from_profile(profile: &Profile, now: DateTime<Utc>) -> Self {
    Self {
      name:       profile.name.clone(),
      email:      profile.email.clone(),
      role:       profile.role,
      image_url:  profile.image_url.clone(),
      created_at: now,
      updated_at: now,
    }
  }
}

// ─── Identity-provider payload ───────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
  pub id:            String,
  pub email_address: String,
}

/// A user object in the identity provider's wire format. Both the user API and
/// the `user.*` webhook events carry this shape.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryUser {
  pub id:                       String,
  pub first_name:               Option<String>,
  pub last_name:                Option<String>,
  pub username:                 Option<String>,
  pub image_url:                Option<String>,
  #[serde(default)]
  pub email_addresses:          Vec<EmailAddress>,
  pub primary_email_address_id: Option<String>,
  #[serde(default)]
  pub public_metadata:          Value,
}

impl DirectoryUser {
  /// The primary email, falling back to the first listed address.
  pub fn primary_email(&self) -> Option<&str> {
    let primary = self.primary_email_address_id.as_deref();
    self
      .email_addresses
      .iter()
      .find(|e| Some(e.id.as_str()) == primary)
      .or_else(|| self.email_addresses.first())
      .map(|e| e.email_address.as_str())
  }

  /// First and last name joined, else username, else email, else the id.
  pub fn display_name(&self) -> String {
    let full = [self.first_name.as_deref(), self.last_name.as_deref()]
      .into_iter()
      .flatten()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" ");
    if !full.is_empty() {
      return full;
    }
    self
      .username
      .as_deref()
      .filter(|s| !s.is_empty())
      .or_else(|| self.primary_email())
      .unwrap_or(self.id.as_str())
      .to_owned()
  }

  pub fn role(&self) -> Role {
    Role::from_claim(self.public_metadata.get("role").and_then(Value::as_str))
  }

  pub fn to_profile(&self) -> Profile {
    Profile {
      id:        self.id.clone(),
      name:      self.display_name(),
      email:     self.primary_email().map(str::to_owned),
      image_url: self.image_url.clone(),
      role:      self.role(),
    }
  }
}
