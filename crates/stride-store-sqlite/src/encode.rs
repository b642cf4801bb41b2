//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and document bodies as compact
//! JSON text.

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value};
use stride_core::{store::Document, timestamp::TIMESTAMP_FIELDS};

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Document bodies
// ──────────────────────────────────────────────────────────

pub fn encode_data(data: &Map<String, Value>) -> Result<String> {
  Ok(serde_json::to_string(data)?)
}

// ─── Query fields
// ─────────────────────────────────────────────────────────────

/// The JSON1 path for a top-level body field.
pub fn json_path(field: &str) -> Result<String> {
  let valid = !field.is_empty()
    && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
  if !valid {
    return Err(Error::InvalidField(field.to_owned()));
  }
  Ok(format!("$.{field}"))
}

/// The `ORDER BY` expression for `field`, whose JSON path is bound to
/// parameter `?{param}`.
///
/// Timestamp fields may hold RFC 3339 text, epoch milliseconds or
/// `{seconds, nanoseconds}` objects; they sort on a common unix-seconds key.
/// Anything unrecognised sorts as `NULL`. Other fields sort on the raw value.
pub fn order_key(field: &str, param: usize) -> String {
  let value = format!("json_extract(data_json, ?{param})");
  if !TIMESTAMP_FIELDS.contains(&field) {
    return value;
  }
  let member =
    |name: &str| format!("json_extract(data_json, ?{param} || '.{name}')");
  format!(
    "CASE json_type(data_json, ?{param})
       WHEN 'text'    THEN (julianday({value}) - 2440587.5) * 86400.0
       WHEN 'integer' THEN {value} / 1000.0
       WHEN 'real'    THEN {value} / 1000.0
       WHEN 'object'  THEN coalesce({s}, {us}) + coalesce({n}, {un}, 0) / 1e9
     END",
    s = member("seconds"),
    us = member("_seconds"),
    n = member("nanoseconds"),
    un = member("_nanoseconds"),
  )
}

/// Convert a filter value to what `json_extract` yields for the same JSON:
/// booleans become 0/1, containers come back as JSON text.
pub fn to_sql_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
  }
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// Raw column values read from the `documents` table.
pub struct RawDocument {
  pub doc_id:     String,
  pub version:    i64,
  pub data_json:  String,
  pub created_at: String,
  pub updated_at: String,
}

/// Column list matching [`RawDocument::from_row`].
pub const DOCUMENT_COLUMNS: &str =
  "doc_id, version, data_json, created_at, updated_at";

impl RawDocument {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      doc_id:     row.get(0)?,
      version:    row.get(1)?,
      data_json:  row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_document(self) -> Result<Document> {
    let data = match serde_json::from_str(&self.data_json)? {
      Value::Object(map) => map,
      _ => return Err(Error::NotAnObject(self.doc_id)),
    };
    Ok(Document {
      version:    u64::try_from(self.version)
        .map_err(|_| Error::InvalidVersion(self.doc_id.clone(), self.version))?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      id:         self.doc_id,
      data,
    })
  }
}
