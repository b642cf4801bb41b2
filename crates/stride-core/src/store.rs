//! The `DocumentStore` trait and supporting query types.
//!
//! Application state lives in collections of JSON documents keyed by id. The
//! trait is implemented by storage backends (e.g. `stride-store-sqlite`);
//! handlers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{Error, Result, timestamp};

// ─── Collections ─────────────────────────────────────────────────────────────

pub const USERS: &str = "users";
pub const IDENTITIES: &str = "identities";
pub const POLLS: &str = "polls";
pub const ARTICLES: &str = "articles";
pub const CATEGORIES: &str = "categories";

// ─── Document ────────────────────────────────────────────────────────────────

/// A stored document: an id, a JSON object body, and store-managed metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id:         String,
  /// Starts at 1 and increments on every write. Used for conditional updates.
  pub version:    u64,
  pub data:       Map<String, Value>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Document {
  /// Serialise `value` into a document body. Fails unless `value` serialises
  /// to a JSON object.
  pub fn encode<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
      Value::Object(map) => Ok(map),
      _ => Err(Error::NotAnObject),
    }
  }

  /// Deserialise the body into `T` after normalising timestamp fields, so
  /// bodies written by other producers (epoch millis, `{seconds, nanos}`)
  /// decode the same as bodies written by this service.
  pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
    let mut data = self.data.clone();
    timestamp::normalize_fields(&mut data);
    Ok(serde_json::from_value(Value::Object(data))?)
  }

  /// The body as returned to API callers: timestamps normalised and the
  /// document id inserted under `"id"`.
  pub fn into_json(self) -> Value {
    let mut data = self.data;
    timestamp::normalize_fields(&mut data);
    data.insert("id".to_owned(), Value::String(self.id));
    Value::Object(data)
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Asc,
  Desc,
}

/// Parameters for [`DocumentStore::list`]. Field names refer to top-level
/// keys of the document body.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
  /// Every `(field, value)` pair must match exactly.
  pub filters:  Vec<(String, Value)>,
  pub order_by: Option<(String, Direction)>,
  pub limit:    Option<usize>,
}

impl DocumentQuery {
  pub fn new() -> Self { Self::default() }

  pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
    self.filters.push((field.to_owned(), value.into()));
    self
  }

  pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
    self.order_by = Some((field.to_owned(), direction));
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a collection-oriented document database.
///
/// There is no multi-document transaction. The only concurrency primitive is
/// [`DocumentStore::update_if_version`], a per-document compare-and-swap.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a document. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Create or overwrite a document. An overwrite keeps the original
  /// `created_at` and bumps the version.
  fn set<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
    data: Map<String, Value>,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + 'a;

  /// Merge `fields` into an existing document (JSON merge-patch semantics:
  /// `null` removes a key). Returns `None` if the document does not exist.
  fn merge<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
    fields: Map<String, Value>,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Replace the body only if the stored version equals `expected_version`.
  ///
  /// Returns `None` if the document is missing or was written since it was
  /// read; the caller decides whether that is a conflict.
  fn update_if_version<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
    expected_version: u64,
    data: Map<String, Value>,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Delete a document. Returns `true` if a document was removed.
  fn delete<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// List documents in `collection` matching `query`.
  fn list<'a>(
    &'a self,
    collection: &'a str,
    query: &'a DocumentQuery,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;
}
