//! Router-level tests against an in-memory store and fake upstream services.

use std::sync::{Arc, Mutex};

use axum::{
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use serde_json::{Map, Value, json};
use stride_core::{
  chat::{ChatService, ChatUser},
  identity::IdentityProvider,
  statement::{StatementValidator, Verdict},
  store::{Document, DocumentQuery, DocumentStore, IDENTITIES, POLLS, USERS},
  upstream::Upstream,
  user::{Caller, Profile, Role},
};
use stride_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::{ApiConfig, AppState, router, webhook};

const WEBHOOK_SECRET: &str = "whsec_c2VjcmV0LWtleS1mb3ItdGVzdHM=";

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("fake upstream failure")]
struct FakeError;

/// Accepts tokens of the form `token-<user id>`.
struct FakeIdentity;

impl IdentityProvider for FakeIdentity {
  type Error = FakeError;

  async fn verify_session(&self, token: &str) -> Result<Option<Caller>, FakeError> {
    Ok(token.strip_prefix("token-").map(|id| Caller {
      user_id: id.to_owned(),
      role:    Role::Member,
    }))
  }

  async fn get_profile(&self, user_id: &str) -> Result<Profile, FakeError> {
    if user_id == "ghost" {
      return Err(FakeError);
    }
    Ok(Profile {
      id:        user_id.to_owned(),
      name:      "Ada Lovelace".into(),
      email:     Some("ada@example.com".into()),
      image_url: None,
      role:      Role::Member,
    })
  }
}

/// Fails to add members to the channel named `broken`.
#[derive(Default)]
struct FakeChat {
  upserted: Mutex<Vec<ChatUser>>,
}

impl ChatService for FakeChat {
  type Error = FakeError;

  async fn upsert_user(&self, user: &ChatUser) -> Result<(), FakeError> {
    self.upserted.lock().unwrap().push(user.clone());
    Ok(())
  }

  async fn add_member(&self, channel_id: &str, _user_id: &str) -> Result<(), FakeError> {
    if channel_id == "broken" { Err(FakeError) } else { Ok(()) }
  }

  fn user_token(&self, user_id: &str) -> Result<String, FakeError> {
    Ok(format!("chat-token-{user_id}"))
  }

  fn api_key(&self) -> &str { "chat-key" }
}

/// Accepts statements that start with "I ".
struct FakeValidator;

impl StatementValidator for FakeValidator {
  type Error = FakeError;

  async fn validate(&self, statement: &str) -> Result<Verdict, FakeError> {
    let valid = statement.starts_with("I ");
    Ok(Verdict {
      valid,
      feedback: if valid { "Nice." } else { "Start with I." }.into(),
    })
  }
}

#[derive(Default)]
struct FakeUpstream {
  chat: FakeChat,
}

impl Upstream for FakeUpstream {
  type Identity = FakeIdentity;
  type Chat = FakeChat;
  type Validator = FakeValidator;

  fn identity(&self) -> &FakeIdentity { &FakeIdentity }

  fn chat(&self) -> &FakeChat { &self.chat }

  fn validator(&self) -> &FakeValidator { &FakeValidator }
}

/// Writes to every document between a handler's read and its conditional
/// update, so the update always loses the race.
struct RacingStore(SqliteStore);

impl DocumentStore for RacingStore {
  type Error = stride_store_sqlite::Error;

  async fn get(&self, c: &str, id: &str) -> Result<Option<Document>, Self::Error> {
    self.0.get(c, id).await
  }

  async fn set(
    &self,
    c: &str,
    id: &str,
    data: Map<String, Value>,
  ) -> Result<Document, Self::Error> {
    self.0.set(c, id, data).await
  }

  async fn merge(
    &self,
    c: &str,
    id: &str,
    fields: Map<String, Value>,
  ) -> Result<Option<Document>, Self::Error> {
    self.0.merge(c, id, fields).await
  }

  async fn update_if_version(
    &self,
    c: &str,
    id: &str,
    expected_version: u64,
    data: Map<String, Value>,
  ) -> Result<Option<Document>, Self::Error> {
    self.0.merge(c, id, Map::new()).await?;
    self.0.update_if_version(c, id, expected_version, data).await
  }

  async fn delete(&self, c: &str, id: &str) -> Result<bool, Self::Error> {
    self.0.delete(c, id).await
  }

  async fn list(
    &self,
    c: &str,
    query: &DocumentQuery,
  ) -> Result<Vec<Document>, Self::Error> {
    self.0.list(c, query).await
  }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

fn state_with<S: DocumentStore>(store: S) -> AppState<S, FakeUpstream> {
  AppState {
    store:    Arc::new(store),
    upstream: Arc::new(FakeUpstream::default()),
    config:   Arc::new(ApiConfig {
      webhook_secret: WEBHOOK_SECRET.into(),
      chat_channels:  vec!["community".into(), "broken".into(), "wins".into()],
    }),
  }
}

async fn make_state() -> AppState<SqliteStore, FakeUpstream> {
  state_with(SqliteStore::open_in_memory().await.unwrap())
}

async fn send<S: DocumentStore + 'static>(
  state: &AppState<S, FakeUpstream>,
  method: Method,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(t) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
  }
  let req = match body {
    Some(b) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn body(v: Value) -> Map<String, Value> { v.as_object().cloned().unwrap() }

const ADA: Option<&str> = Some("token-user_1");

async fn seed_poll<S: DocumentStore>(store: &S, id: &str, settings: Value) {
  store
    .set(
      POLLS,
      id,
      body(json!({
        "question": "Lunch?",
        "options": [{ "id": "opt_1", "text": "Tacos" }],
        "votes": { "opt_1": 2 },
        "settings": settings,
        "createdBy": "user_9",
        "createdAt": { "seconds": 1_700_000_000, "nanoseconds": 0 }
      })),
    )
    .await
    .unwrap();
}

fn open_settings() -> Value { json!({ "participantsCanAddOptions": true }) }

// ─── Health and auth ─────────────────────────────────────────────────────────

#[tokio::test]
async fn health_needs_no_session() {
  let state = make_state().await;
  let (status, body) = send(&state, Method::GET, "/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn protected_routes_reject_missing_or_invalid_sessions() {
  let state = make_state().await;
  for token in [None, Some("forged")] {
    let (status, body) = send(&state, Method::GET, "/coaches", token, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
  }
}

#[tokio::test]
async fn session_cookie_is_accepted() {
  let state = make_state().await;
  let req = Request::builder()
    .uri("/categories")
    .header(header::COOKIE, "__session=token-user_1")
    .body(Body::empty())
    .unwrap();
  let resp = router(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
}

// ─── Poll options ────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_option_then_reject_case_insensitive_duplicate() {
  let state = make_state().await;
  seed_poll(&*state.store, "p1", open_settings()).await;

  let (status, resp) = send(
    &state,
    Method::POST,
    "/polls/options",
    ADA,
    Some(json!({ "pollId": "p1", "optionText": " Pizza " })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(resp["option"]["text"], "Pizza");
  let new_id = resp["option"]["id"].as_str().unwrap().to_owned();
  assert!(new_id.starts_with("opt_"), "{new_id}");

  let stored = state.store.get(POLLS, "p1").await.unwrap().unwrap();
  assert_eq!(stored.version, 2);
  assert_eq!(stored.data["options"].as_array().unwrap().len(), 2);
  assert_eq!(stored.data["votes"][&new_id], 0);
  assert_eq!(stored.data["votes"]["opt_1"], 2);
  assert_eq!(stored.data["createdBy"], "user_9");

  let (status, resp) = send(
    &state,
    Method::POST,
    "/polls/options",
    ADA,
    Some(json!({ "pollId": "p1", "optionText": "pizza" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(resp["error"], "This option already exists");
  let after = state.store.get(POLLS, "p1").await.unwrap().unwrap();
  assert_eq!(after.version, 2);
}

#[tokio::test]
async fn add_option_keeps_unmodelled_option_fields() {
  let state = make_state().await;
  state
    .store
    .set(
      POLLS,
      "p1",
      body(json!({
        "question": "Lunch?",
        "options": [{ "id": "opt_1", "text": "Tacos", "addedBy": "user_9" }],
        "votes": { "opt_1": 2 },
        "settings": open_settings()
      })),
    )
    .await
    .unwrap();

  let (status, _) = send(
    &state,
    Method::POST,
    "/polls/options",
    ADA,
    Some(json!({ "pollId": "p1", "optionText": "Sushi" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let stored = state.store.get(POLLS, "p1").await.unwrap().unwrap();
  let options = stored.data["options"].as_array().unwrap();
  assert_eq!(
    options[0],
    json!({ "id": "opt_1", "text": "Tacos", "addedBy": "user_9" })
  );
  assert_eq!(options[1]["text"], "Sushi");
}

#[tokio::test]
async fn add_option_validation_order() {
  let state = make_state().await;
  let cases = [
    (None, json!({}), StatusCode::UNAUTHORIZED, "Unauthorized"),
    (ADA, json!({}), StatusCode::BAD_REQUEST, "Poll ID is required"),
    (
      ADA,
      json!({ "pollId": "  ", "optionText": "x" }),
      StatusCode::BAD_REQUEST,
      "Poll ID is required",
    ),
    (
      ADA,
      json!({ "pollId": "p1", "optionText": "   " }),
      StatusCode::BAD_REQUEST,
      "Option text is required",
    ),
    (
      ADA,
      json!({ "pollId": "nope", "optionText": "Sushi" }),
      StatusCode::NOT_FOUND,
      "Poll not found",
    ),
  ];

  for (token, payload, want_status, want_error) in cases {
    let (status, resp) =
      send(&state, Method::POST, "/polls/options", token, Some(payload)).await;
    assert_eq!(status, want_status);
    assert_eq!(resp["error"], want_error);
  }
}

#[tokio::test]
async fn locked_closed_and_expired_polls_are_left_untouched() {
  let state = make_state().await;
  let past = (Utc::now() - Duration::hours(1)).to_rfc3339();
  seed_poll(&*state.store, "locked", json!({})).await;
  seed_poll(&*state.store, "expired", json!({
    "participantsCanAddOptions": true,
    "activeTill": past
  }))
  .await;
  seed_poll(&*state.store, "closed", open_settings()).await;
  state
    .store
    .merge(POLLS, "closed", body(json!({ "closedAt": past })))
    .await
    .unwrap();

  let cases = [
    ("locked", StatusCode::FORBIDDEN, "Adding options is not allowed for this poll"),
    ("closed", StatusCode::BAD_REQUEST, "This poll is closed"),
    ("expired", StatusCode::BAD_REQUEST, "This poll has expired"),
  ];
  for (poll_id, want_status, want_error) in cases {
    let before = state.store.get(POLLS, poll_id).await.unwrap().unwrap();
    let (status, resp) = send(
      &state,
      Method::POST,
      "/polls/options",
      ADA,
      Some(json!({ "pollId": poll_id, "optionText": "Sushi" })),
    )
    .await;
    assert_eq!(status, want_status, "{poll_id}");
    assert_eq!(resp["error"], want_error);
    let after = state.store.get(POLLS, poll_id).await.unwrap().unwrap();
    assert_eq!(after, before);
  }
}

#[tokio::test]
async fn lost_race_is_reported_as_conflict() {
  let state = state_with(RacingStore(SqliteStore::open_in_memory().await.unwrap()));
  seed_poll(&*state.store, "p1", open_settings()).await;

  let (status, resp) = send(
    &state,
    Method::POST,
    "/polls/options",
    ADA,
    Some(json!({ "pollId": "p1", "optionText": "Pizza" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(resp["error"], "Poll was modified concurrently; please retry");

  let stored = state.store.get(POLLS, "p1").await.unwrap().unwrap();
  assert_eq!(stored.data["options"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn get_poll_normalises_timestamps() {
  let state = make_state().await;
  seed_poll(&*state.store, "p1", open_settings()).await;

  let (status, resp) = send(&state, Method::GET, "/polls/p1", ADA, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(resp["id"], "p1");
  assert_eq!(resp["createdAt"], "2023-11-14T22:13:20.000Z");

  let (status, _) = send(&state, Method::GET, "/polls/missing", ADA, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Identity statement ──────────────────────────────────────────────────────

#[tokio::test]
async fn identity_history_grows_with_each_save() {
  let state = make_state().await;

  let (status, resp) = send(&state, Method::GET, "/identity", ADA, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(resp, json!({ "statement": null, "history": [] }));

  let inputs = ["I am a runner", "  I train daily  ", "I finish races"];
  for input in inputs {
    let (status, _) = send(
      &state,
      Method::POST,
      "/identity",
      ADA,
      Some(json!({ "statement": input })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  let (_, resp) = send(&state, Method::GET, "/identity", ADA, None).await;
  assert_eq!(resp["statement"], "I finish races");
  let history = resp["history"].as_array().unwrap();
  assert_eq!(history.len(), inputs.len() - 1);
  assert_eq!(history[1]["statement"], "I train daily");
  assert!(history[0]["setAt"].as_str().unwrap().ends_with('Z'));

  let doc = state.store.get(IDENTITIES, "user_1").await.unwrap().unwrap();
  assert_eq!(doc.version, 3);
}

#[tokio::test]
async fn blank_statement_is_rejected() {
  let state = make_state().await;
  for payload in [json!({ "statement": "   " }), json!({})] {
    let (status, resp) =
      send(&state, Method::POST, "/identity", ADA, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Statement is required");
  }
  assert!(state.store.get(IDENTITIES, "user_1").await.unwrap().is_none());
}

#[tokio::test]
async fn statement_validation_returns_verdict() {
  let state = make_state().await;
  let (status, resp) = send(
    &state,
    Method::POST,
    "/identity/validate",
    ADA,
    Some(json!({ "statement": "I am a climber" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(resp, json!({ "valid": true, "feedback": "Nice." }));

  let (status, _) = send(
    &state,
    Method::POST,
    "/identity/validate",
    ADA,
    Some(json!({ "statement": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Chat ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_join_reports_failed_channels_without_failing() {
  let state = make_state().await;
  let (status, resp) = send(&state, Method::POST, "/chat/join", ADA, None).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    resp,
    json!({
      "userId": "user_1",
      "token": "chat-token-user_1",
      "apiKey": "chat-key",
      "joinedChannels": ["community", "wins"],
      "failedChannels": ["broken"]
    })
  );
  let upserted = state.upstream.chat.upserted.lock().unwrap().clone();
  assert_eq!(upserted.len(), 1);
  assert_eq!(upserted[0].name, "Ada Lovelace");
}

#[tokio::test]
async fn chat_join_profile_failure_is_a_generic_500() {
  let state = make_state().await;
  let (status, resp) =
    send(&state, Method::POST, "/chat/join", Some("token-ghost"), None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(resp, json!({ "error": "Internal server error" }));
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn coaches_are_listed_by_name() {
  let state = make_state().await;
  for (id, name, role) in [
    ("u1", "Zoe", "coach"),
    ("u2", "Abe", "member"),
    ("u3", "Mia", "coach"),
  ] {
    state
      .store
      .set(USERS, id, body(json!({ "name": name, "role": role })))
      .await
      .unwrap();
  }

  let (status, resp) = send(&state, Method::GET, "/coaches", ADA, None).await;
  assert_eq!(status, StatusCode::OK);
  let names: Vec<_> = resp
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["name"].clone())
    .collect();
  assert_eq!(names, vec![json!("Mia"), json!("Zoe")]);
  assert_eq!(resp[0]["id"], "u3");
}

#[tokio::test]
async fn articles_filter_by_category_newest_first() {
  let state = make_state().await;
  for (id, category, published) in [
    ("a1", "sleep", "2024-01-01T00:00:00Z"),
    ("a2", "sleep", "2024-03-01T00:00:00Z"),
    ("a3", "focus", "2024-02-01T00:00:00Z"),
  ] {
    state
      .store
      .set(
        "articles",
        id,
        body(json!({ "title": id, "category": category, "publishedAt": published })),
      )
      .await
      .unwrap();
  }

  let (_, all) = send(&state, Method::GET, "/articles", ADA, None).await;
  let ids: Vec<_> = all.as_array().unwrap().iter().map(|a| a["id"].clone()).collect();
  assert_eq!(ids, vec![json!("a2"), json!("a3"), json!("a1")]);
  assert_eq!(all[0]["publishedAt"], "2024-03-01T00:00:00.000Z");

  let (_, sleep) =
    send(&state, Method::GET, "/articles?category=sleep", ADA, None).await;
  let ids: Vec<_> = sleep.as_array().unwrap().iter().map(|a| a["id"].clone()).collect();
  assert_eq!(ids, vec![json!("a2"), json!("a1")]);
}

#[tokio::test]
async fn articles_with_timestamp_objects_are_newest_first() {
  let state = make_state().await;
  for (id, published) in [
    ("old", json!({ "seconds": 1_600_000_000, "nanoseconds": 900_000_000 })),
    ("new", json!({ "seconds": 1_700_000_000, "nanoseconds": 0 })),
  ] {
    state
      .store
      .set("articles", id, body(json!({ "title": id, "publishedAt": published })))
      .await
      .unwrap();
  }

  let (status, resp) = send(&state, Method::GET, "/articles", ADA, None).await;
  assert_eq!(status, StatusCode::OK);
  let ids: Vec<_> = resp.as_array().unwrap().iter().map(|a| a["id"].clone()).collect();
  assert_eq!(ids, vec![json!("new"), json!("old")]);
  assert_eq!(resp[0]["publishedAt"], "2023-11-14T22:13:20.000Z");
}

#[tokio::test]
async fn categories_are_empty_or_sorted_with_normalised_timestamps() {
  let state = make_state().await;
  let (status, resp) = send(&state, Method::GET, "/categories", ADA, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(resp, json!([]));

  for (id, name) in [("c1", "Sleep"), ("c2", "Focus")] {
    state
      .store
      .set(
        "categories",
        id,
        body(json!({ "name": name, "createdAt": 1_700_000_000_000_i64 })),
      )
      .await
      .unwrap();
  }
  let (_, resp) = send(&state, Method::GET, "/categories", ADA, None).await;
  assert_eq!(resp[0]["name"], "Focus");
  assert_eq!(resp[1]["createdAt"], "2023-11-14T22:13:20.000Z");
}

// ─── Webhooks ────────────────────────────────────────────────────────────────

async fn deliver(
  state: &AppState<SqliteStore, FakeUpstream>,
  event: Value,
  tamper: bool,
) -> (StatusCode, axum::body::Bytes) {
  let payload = event.to_string();
  let ts = Utc::now().timestamp().to_string();
  let sig = webhook::sign(WEBHOOK_SECRET, "msg_1", &ts, payload.as_bytes()).unwrap();
  let sent = if tamper { payload.replace("Ada", "Eve") } else { payload };

  let req = Request::builder()
    .method(Method::POST)
    .uri("/webhooks/clerk")
    .header("svix-id", "msg_1")
    .header("svix-timestamp", ts)
    .header("svix-signature", sig)
    .body(Body::from(sent))
    .unwrap();
  let resp = router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  (status, bytes)
}

fn user_event(kind: &str, first_name: &str) -> Value {
  json!({
    "type": kind,
    "data": {
      "id": "user_1",
      "first_name": first_name,
      "last_name": "Lovelace",
      "email_addresses": [{ "id": "e1", "email_address": "ada@example.com" }],
      "primary_email_address_id": "e1",
      "public_metadata": { "role": "coach" }
    }
  })
}

#[tokio::test]
async fn webhook_mirrors_user_lifecycle() {
  let state = make_state().await;

  let (status, bytes) = deliver(&state, user_event("user.created", "Ada"), false).await;
  assert_eq!(status, StatusCode::OK);
  assert!(bytes.is_empty());
  let created = state.store.get(USERS, "user_1").await.unwrap().unwrap();
  assert_eq!(created.data["name"], "Ada Lovelace");
  assert_eq!(created.data["role"], "coach");

  let (status, _) = deliver(&state, user_event("user.updated", "Augusta"), false).await;
  assert_eq!(status, StatusCode::OK);
  let updated = state.store.get(USERS, "user_1").await.unwrap().unwrap();
  assert_eq!(updated.data["name"], "Augusta Lovelace");
  assert_eq!(updated.data["createdAt"], created.data["createdAt"]);

  let (status, _) = deliver(
    &state,
    json!({ "type": "user.deleted", "data": { "id": "user_1", "deleted": true } }),
    false,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(state.store.get(USERS, "user_1").await.unwrap().is_none());

  let before_recreate = Utc::now();
  deliver(&state, user_event("user.created", "Ada"), false).await;
  let recreated = state.store.get(USERS, "user_1").await.unwrap().unwrap();
  assert_eq!(recreated.version, 1);
  assert!(recreated.created_at >= before_recreate);
  assert_ne!(recreated.data["createdAt"], created.data["createdAt"]);
}

#[tokio::test]
async fn webhook_update_for_unknown_user_creates_it() {
  let state = make_state().await;
  let (status, _) = deliver(&state, user_event("user.updated", "Ada"), false).await;
  assert_eq!(status, StatusCode::OK);
  let doc = state.store.get(USERS, "user_1").await.unwrap().unwrap();
  assert_eq!(doc.data["email"], "ada@example.com");
}

#[tokio::test]
async fn webhook_rejects_bad_signatures_and_ignores_other_events() {
  let state = make_state().await;

  let (status, bytes) = deliver(&state, user_event("user.created", "Ada"), true).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(bytes.is_empty());
  assert!(state.store.get(USERS, "user_1").await.unwrap().is_none());

  let (status, _) = deliver(
    &state,
    json!({ "type": "session.created", "data": { "id": "sess_1" } }),
    false,
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = deliver(
    &state,
    json!({ "type": "user.created", "data": { "first_name": "no id" } }),
    false,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
