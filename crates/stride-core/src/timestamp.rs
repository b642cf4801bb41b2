//! Timestamp normalisation for documents written by other producers.
//!
//! Content documents arrive in several shapes: RFC 3339 strings, Firestore
//! timestamp objects (`{seconds, nanoseconds}`, or `{_seconds, _nanoseconds}`
//! once serialised by the admin SDK) and epoch milliseconds. Everything the
//! API returns uses RFC 3339 with millisecond precision.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};

/// Keys treated as timestamps wherever they appear in a document.
pub const TIMESTAMP_FIELDS: &[&str] = &[
  "createdAt",
  "updatedAt",
  "publishedAt",
  "setAt",
  "closedAt",
  "activeTill",
];

/// Canonical textual form used in API responses.
pub fn format(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Interpret a JSON value as a point in time. Returns `None` for anything
/// that is not one of the recognised shapes.
pub fn parse(value: &Value) -> Option<DateTime<Utc>> {
  match value {
    Value::String(s) => DateTime::parse_from_rfc3339(s)
      .ok()
      .map(|dt| dt.with_timezone(&Utc)),
    Value::Number(n) => n
      .as_i64()
      .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
    Value::Object(map) => {
      let seconds = map
        .get("seconds")
        .or_else(|| map.get("_seconds"))
        .and_then(Value::as_i64)?;
      let nanos = map
        .get("nanoseconds")
        .or_else(|| map.get("_nanoseconds"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
      Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
    }
    _ => None,
  }
}

/// Rewrite every recognised timestamp field in `map`, recursing into nested
/// objects and arrays. Unparseable values and `null` are left untouched.
pub fn normalize_fields(map: &mut Map<String, Value>) {
  for (key, value) in map.iter_mut() {
    if TIMESTAMP_FIELDS.contains(&key.as_str())
      && let Some(dt) = parse(value)
    {
      *value = Value::String(format(dt));
      continue;
    }
    normalize_nested(value);
  }
}

fn normalize_nested(value: &mut Value) {
  match value {
    Value::Object(map) => normalize_fields(map),
    Value::Array(items) => items.iter_mut().for_each(normalize_nested),
    _ => {}
  }
}
