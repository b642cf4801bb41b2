//! Handlers for `/polls` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/polls/options` | Body: `{"pollId":"…","optionText":"…"}`; 201 on success |
//! | `GET`  | `/polls/{id}` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use stride_core::{
  poll::Poll,
  store::{DocumentStore, POLLS},
  upstream::Upstream,
};

use crate::{AppState, auth::AuthenticatedUser, docs, error::ApiError};

const POLL_NOT_FOUND: &str = "Poll not found";

// ─── Add option ──────────────────────────────────────────────────────────────

/// Fields are optional so that missing values surface as the specific
/// messages below rather than a generic deserialisation error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOptionBody {
  #[serde(default)]
  pub poll_id:     Option<String>,
  #[serde(default)]
  pub option_text: Option<String>,
}

fn required<'a>(
  value: Option<&'a str>,
  message: &str,
) -> Result<&'a str, ApiError> {
  value
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .ok_or_else(|| ApiError::BadRequest(message.to_owned()))
}

/// `POST /polls/options`
///
/// The write is a compare-and-swap on the poll's version: if another writer
/// got there first the request fails with 409 and nothing is written.
pub async fn add_option<S, U>(
  State(state): State<AppState<S, U>>,
  AuthenticatedUser(caller): AuthenticatedUser,
  body: Result<Json<AddOptionBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  let Json(body) = body?;
  let poll_id = required(body.poll_id.as_deref(), "Poll ID is required")?;
  let text = required(body.option_text.as_deref(), "Option text is required")?;

  let (doc, mut poll) = docs::get_as::<Poll, _>(&*state.store, POLLS, poll_id)
    .await?
    .ok_or_else(|| ApiError::NotFound(POLL_NOT_FOUND.to_owned()))?;

  let option = poll.add_option(text, Utc::now())?;

  // Append to the stored JSON rather than re-serialising the typed poll, so
  // fields this service does not model survive the write.
  let mut data = doc.data;
  let entry = serde_json::to_value(&option)?;
  match data.get_mut("options") {
    Some(Value::Array(options)) => options.push(entry),
    _ => {
      data.insert("options".to_owned(), Value::Array(vec![entry]));
    }
  }
  match data.get_mut("votes") {
    Some(Value::Object(votes)) => {
      votes.insert(option.id.clone(), json!(0));
    }
    _ => {
      let votes = Map::from_iter([(option.id.clone(), json!(0))]);
      data.insert("votes".to_owned(), Value::Object(votes));
    }
  }

  let written = state
    .store
    .update_if_version(POLLS, poll_id, doc.version, data)
    .await
    .map_err(ApiError::store)?;
  if written.is_none() {
    tracing::warn!(poll_id, "lost a concurrent update to poll");
    return Err(ApiError::Conflict(
      "Poll was modified concurrently; please retry".to_owned(),
    ));
  }

  tracing::info!(
    poll_id,
    option_id = %option.id,
    user_id = %caller.user_id,
    "poll option added"
  );
  Ok((StatusCode::CREATED, Json(json!({ "option": option }))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /polls/{id}`
pub async fn get_one<S, U>(
  State(state): State<AppState<S, U>>,
  _caller: AuthenticatedUser,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  let doc = state
    .store
    .get(POLLS, &id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(POLL_NOT_FOUND.to_owned()))?;
  Ok(Json(doc.into_json()))
}
