//! `POST /webhooks/clerk`: mirror identity-provider user events into the
//! `users` collection.
//!
//! Deliveries are signed the Svix way: HMAC-SHA256 over
//! `"{svix-id}.{svix-timestamp}.{body}"`, keyed with the base64 part of the
//! `whsec_…` secret. The `svix-signature` header holds one or more
//! space-separated `v1,<base64>` entries; any match is accepted.
//!
//! Responses carry no body. A verification failure is a 400 and touches
//! nothing.

use axum::{
  extract::State,
  http::{HeaderMap, StatusCode},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use sha2::Sha256;
use stride_core::{
  store::{Document, DocumentStore, USERS},
  upstream::Upstream,
  user::{DirectoryUser, UserRecord},
};
use thiserror::Error;

use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Maximum clock skew accepted between the sender's timestamp and ours.
pub const TOLERANCE_SECS: i64 = 5 * 60;

// ─── Verification ────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
  #[error("missing header {0}")]
  MissingHeader(&'static str),
  #[error("timestamp is not a unix time")]
  BadTimestamp,
  #[error("timestamp outside tolerance")]
  StaleTimestamp,
  #[error("webhook secret is not valid base64")]
  BadSecret,
  #[error("no matching signature")]
  SignatureMismatch,
}

fn header<'a>(
  headers: &'a HeaderMap,
  name: &'static str,
) -> Result<&'a str, VerifyError> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .ok_or(VerifyError::MissingHeader(name))
}

fn signing_key(secret: &str) -> Result<Vec<u8>, VerifyError> {
  let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
  B64.decode(encoded).map_err(|_| VerifyError::BadSecret)
}

fn mac(
  key: &[u8],
  id: &str,
  timestamp: &str,
  body: &[u8],
) -> Result<HmacSha256, VerifyError> {
  let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
    .map_err(|_| VerifyError::BadSecret)?;
  mac.update(id.as_bytes());
  mac.update(b".");
  mac.update(timestamp.as_bytes());
  mac.update(b".");
  mac.update(body);
  Ok(mac)
}

/// The `v1,<base64>` signature for a delivery, as a sender would compute it.
pub fn sign(
  secret: &str,
  id: &str,
  timestamp: &str,
  body: &[u8],
) -> Result<String, VerifyError> {
  let key = signing_key(secret)?;
  let tag = mac(&key, id, timestamp, body)?.finalize().into_bytes();
  Ok(format!("v1,{}", B64.encode(tag)))
}

/// Check a delivery's signature and timestamp against `secret`.
pub fn verify(
  secret: &str,
  headers: &HeaderMap,
  body: &[u8],
  now: DateTime<Utc>,
) -> Result<(), VerifyError> {
  let id = header(headers, "svix-id")?;
  let timestamp = header(headers, "svix-timestamp")?;
  let signatures = header(headers, "svix-signature")?;

  let sent: i64 = timestamp
    .trim()
    .parse()
    .map_err(|_| VerifyError::BadTimestamp)?;
  let skew = now
    .timestamp()
    .checked_sub(sent)
    .map(i64::unsigned_abs)
    .ok_or(VerifyError::StaleTimestamp)?;
  if skew > TOLERANCE_SECS.unsigned_abs() {
    return Err(VerifyError::StaleTimestamp);
  }

  let expected = mac(&signing_key(secret)?, id, timestamp, body)?;
  let matched = signatures
    .split_whitespace()
    .filter_map(|entry| entry.split_once(','))
    .filter(|(version, _)| *version == "v1")
    .filter_map(|(_, sig)| B64.decode(sig).ok())
    .any(|sig| expected.clone().verify_slice(&sig).is_ok());

  if matched { Ok(()) } else { Err(VerifyError::SignatureMismatch) }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WebhookEvent {
  #[serde(rename = "type")]
  kind: String,
  #[serde(default)]
  data: Value,
}

#[derive(Debug, Deserialize)]
struct DeletedUser {
  id: Option<String>,
}

#[derive(Debug, Error)]
enum DispatchError {
  #[error("malformed payload: {0}")]
  Payload(#[from] serde_json::Error),
  #[error("encoding error: {0}")]
  Encode(#[from] stride_core::Error),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DispatchError {
  fn status(&self) -> StatusCode {
    match self {
      DispatchError::Payload(_) => StatusCode::BAD_REQUEST,
      DispatchError::Encode(_) | DispatchError::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

fn store_err(e: impl std::error::Error + Send + Sync + 'static) -> DispatchError {
  DispatchError::Store(Box::new(e))
}

/// Mutable fields of a user record, as a merge patch. `null` clears a field.
fn user_patch(record: &UserRecord) -> Map<String, Value> {
  let mut patch = Map::new();
  patch.insert("name".into(), json!(record.name));
  patch.insert("email".into(), json!(record.email));
  patch.insert("role".into(), json!(record.role));
  patch.insert("imageUrl".into(), json!(record.image_url));
  patch.insert("updatedAt".into(), json!(record.updated_at));
  patch
}

async fn dispatch<S: DocumentStore>(
  store: &S,
  event: WebhookEvent,
  now: DateTime<Utc>,
) -> Result<(), DispatchError> {
  match event.kind.as_str() {
    "user.created" => {
      let user: DirectoryUser = serde_json::from_value(event.data)?;
      let record = UserRecord::from_profile(&user.to_profile(), now);
      store
        .set(USERS, &user.id, Document::encode(&record)?)
        .await
        .map_err(store_err)?;
      tracing::info!(user_id = %user.id, "user record created");
    }
    "user.updated" => {
      let user: DirectoryUser = serde_json::from_value(event.data)?;
      let record = UserRecord::from_profile(&user.to_profile(), now);
      let merged = store
        .merge(USERS, &user.id, user_patch(&record))
        .await
        .map_err(store_err)?;
      if merged.is_none() {
        store
          .set(USERS, &user.id, Document::encode(&record)?)
          .await
          .map_err(store_err)?;
      }
      tracing::info!(user_id = %user.id, "user record updated");
    }
    "user.deleted" => {
      let user: DeletedUser = serde_json::from_value(event.data)?;
      match user.id {
        Some(id) => {
          let removed = store.delete(USERS, &id).await.map_err(store_err)?;
          tracing::info!(user_id = %id, removed, "user record deleted");
        }
        None => tracing::warn!("user.deleted event without a user id"),
      }
    }
    other => tracing::debug!(kind = other, "ignoring webhook event"),
  }
  Ok(())
}

/// `POST /webhooks/clerk`
pub async fn clerk<S, U>(
  State(state): State<AppState<S, U>>,
  headers: HeaderMap,
  body: Bytes,
) -> StatusCode
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  let now = Utc::now();
  if let Err(e) = verify(&state.config.webhook_secret, &headers, &body, now) {
    tracing::warn!(error = %e, "rejected webhook delivery");
    return StatusCode::BAD_REQUEST;
  }

  let event: WebhookEvent = match serde_json::from_slice(&body) {
    Ok(event) => event,
    Err(e) => {
      tracing::warn!(error = %e, "malformed webhook payload");
      return StatusCode::BAD_REQUEST;
    }
  };

  match dispatch(&*state.store, event, now).await {
    Ok(()) => StatusCode::OK,
    Err(e) => {
      let status = e.status();
      if status.is_server_error() {
        tracing::error!(error = %e, "webhook dispatch failed");
      } else {
        tracing::warn!(error = %e, "webhook dispatch rejected");
      }
      status
    }
  }
}
