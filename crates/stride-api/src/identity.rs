//! Handlers for the caller's identity statement.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/identity` | `{statement:null, history:[]}` if never set |
//! | `POST` | `/identity` | Body: `{"statement":"…"}` |
//! | `POST` | `/identity/validate` | Body: `{"statement":"…"}`; returns `{valid, feedback}` |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use stride_core::{
  statement::{self, IdentityStatement, StatementValidator, Verdict},
  store::{Document, DocumentStore, IDENTITIES},
  upstream::Upstream,
};

use crate::{AppState, auth::AuthenticatedUser, docs, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct StatementBody {
  #[serde(default)]
  pub statement: Option<String>,
}

/// `GET /identity`
pub async fn get_current<S, U>(
  State(state): State<AppState<S, U>>,
  AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  let doc = state
    .store
    .get(IDENTITIES, &caller.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(match doc {
    Some(doc) => doc.into_json(),
    None => json!({ "statement": null, "history": [] }),
  }))
}

/// `POST /identity`
///
/// Replacing an existing statement is conditional on the version that was
/// read, so two concurrent saves cannot drop a history entry.
pub async fn save<S, U>(
  State(state): State<AppState<S, U>>,
  AuthenticatedUser(caller): AuthenticatedUser,
  body: Result<Json<StatementBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  let Json(body) = body?;
  let input = body.statement.unwrap_or_default();
  // Reject bad input before touching the store.
  statement::clean(&input)?;

  let existing = docs::get_as::<IdentityStatement, _>(
    &*state.store,
    IDENTITIES,
    &caller.user_id,
  )
  .await?;

  let written = match existing {
    Some((doc, current)) => {
      let next = statement::save(Some(current), &input, Utc::now())?;
      state
        .store
        .update_if_version(
          IDENTITIES,
          &caller.user_id,
          doc.version,
          Document::encode(&next)?,
        )
        .await
        .map_err(ApiError::store)?
        .ok_or_else(|| {
          ApiError::Conflict(
            "Statement was modified concurrently; please retry".to_owned(),
          )
        })?
    }
    None => {
      let first = statement::save(None, &input, Utc::now())?;
      state
        .store
        .set(IDENTITIES, &caller.user_id, Document::encode(&first)?)
        .await
        .map_err(ApiError::store)?
    }
  };

  tracing::info!(
    user_id = %caller.user_id,
    version = written.version,
    "identity statement saved"
  );
  Ok(Json(written.into_json()))
}

/// `POST /identity/validate`
pub async fn validate<S, U>(
  State(state): State<AppState<S, U>>,
  _caller: AuthenticatedUser,
  body: Result<Json<StatementBody>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError>
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  let Json(body) = body?;
  let input = body.statement.unwrap_or_default();
  let text = statement::clean(&input)?;
  let verdict = state
    .upstream
    .validator()
    .validate(text)
    .await
    .map_err(ApiError::upstream)?;
  Ok(Json(verdict))
}
