//! Clerk: session verification and user profiles.
//!
//! Sessions are verified networklessly against the instance's PEM public key.
//! Profiles come from the backend API, `GET /v1/users/{id}`.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use stride_core::{
  identity::IdentityProvider,
  user::{Caller, DirectoryUser, Profile, Role},
};

use crate::{Error, Result, http_client, status_error};

/// Connection settings for Clerk.
#[derive(Debug, Clone)]
pub struct ClerkConfig {
  pub api_url:        String,
  pub secret_key:     String,
  /// PEM-encoded RSA public key used to verify session tokens.
  pub jwt_public_key: String,
}

#[derive(Debug, Deserialize)]
struct SessionMetadata {
  role: Option<String>,
}

/// The subset of session-token claims we read. The role may be exposed at
/// the top level or under `metadata`, depending on the session template.
#[derive(Debug, Deserialize)]
struct SessionClaims {
  sub:      String,
  #[serde(default)]
  role:     Option<String>,
  #[serde(default)]
  metadata: Option<SessionMetadata>,
}

impl SessionClaims {
  fn into_caller(self) -> Caller {
    let claim = self
      .metadata
      .and_then(|m| m.role)
      .or(self.role);
    Caller { user_id: self.sub, role: Role::from_claim(claim.as_deref()) }
  }
}

/// Async client for Clerk. Cheap to clone.
#[derive(Clone)]
pub struct ClerkClient {
  client:       Client,
  api_url:      String,
  secret_key:   String,
  decoding_key: DecodingKey,
  validation:   Validation,
}

impl ClerkClient {
  pub fn new(config: ClerkConfig) -> Result<Self> {
    let key = DecodingKey::from_rsa_pem(config.jwt_public_key.as_bytes())?;
    Self::with_key(config.api_url, config.secret_key, key, Algorithm::RS256)
  }

  /// Build a client that verifies sessions with an explicit key and
  /// algorithm.
  pub fn with_key(
    api_url: String,
    secret_key: String,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
  ) -> Result<Self> {
    let mut validation = Validation::new(algorithm);
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "sub"]);
    Ok(Self {
      client: http_client()?,
      api_url: api_url.trim_end_matches('/').to_owned(),
      secret_key,
      decoding_key,
      validation,
    })
  }

  fn url(&self, path: &str) -> String { format!("{}{}", self.api_url, path) }
}

impl IdentityProvider for ClerkClient {
  type Error = Error;

  async fn verify_session(&self, token: &str) -> Result<Option<Caller>> {
    match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
      Ok(data) => Ok(Some(data.claims.into_caller())),
      Err(e) => {
        tracing::debug!(error = %e, "rejected session token");
        Ok(None)
      }
    }
  }

  /// `GET /v1/users/{id}`
  async fn get_profile(&self, user_id: &str) -> Result<Profile> {
    let resp = self
      .client
      .get(self.url(&format!("/v1/users/{user_id}")))
      .bearer_auth(&self.secret_key)
      .send()
      .await?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Err(Error::NotFound(format!("user {user_id}")));
    }
    if !resp.status().is_success() {
      return Err(status_error("clerk", resp).await);
    }
    let user: DirectoryUser = resp.json().await?;
    Ok(user.to_profile())
  }
}
