//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value as SqlValue};
use serde_json::{Map, Value};

use stride_core::store::{Direction, Document, DocumentQuery, DocumentStore};

use crate::{
  Result,
  encode::{
    DOCUMENT_COLUMNS, RawDocument, encode_data, encode_dt, json_path,
    order_key, to_sql_value,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row statement that ends in `RETURNING <DOCUMENT_COLUMNS>`.
  async fn returning_one(
    &self,
    sql: String,
    params: Vec<SqlValue>,
  ) -> Result<Option<Document>> {
    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params_from_iter(params.iter()),
              RawDocument::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = crate::Error;

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
    let collection = collection.to_owned();
    let id = id.to_owned();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM documents
                 WHERE collection = ?1 AND doc_id = ?2"
              ),
              rusqlite::params![collection, id],
              RawDocument::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn set(
    &self,
    collection: &str,
    id: &str,
    data: Map<String, Value>,
  ) -> Result<Document> {
    let now = encode_dt(Utc::now());
    let sql = format!(
      "INSERT INTO documents (collection, doc_id, version, data_json, created_at, updated_at)
       VALUES (?1, ?2, 1, ?3, ?4, ?4)
       ON CONFLICT (collection, doc_id) DO UPDATE SET
         version    = version + 1,
         data_json  = excluded.data_json,
         updated_at = excluded.updated_at
       RETURNING {DOCUMENT_COLUMNS}"
    );
    let params = vec![
      SqlValue::Text(collection.to_owned()),
      SqlValue::Text(id.to_owned()),
      SqlValue::Text(encode_data(&data)?),
      SqlValue::Text(now),
    ];

    self
      .returning_one(sql, params)
      .await?
      .ok_or_else(|| crate::Error::UpsertReturnedNothing(id.to_owned()))
  }

  async fn merge(
    &self,
    collection: &str,
    id: &str,
    fields: Map<String, Value>,
  ) -> Result<Option<Document>> {
    let sql = format!(
      "UPDATE documents SET
         version    = version + 1,
         data_json  = json_patch(data_json, ?3),
         updated_at = ?4
       WHERE collection = ?1 AND doc_id = ?2
       RETURNING {DOCUMENT_COLUMNS}"
    );
    let params = vec![
      SqlValue::Text(collection.to_owned()),
      SqlValue::Text(id.to_owned()),
      SqlValue::Text(encode_data(&fields)?),
      SqlValue::Text(encode_dt(Utc::now())),
    ];
    self.returning_one(sql, params).await
  }

  async fn update_if_version(
    &self,
    collection: &str,
    id: &str,
    expected_version: u64,
    data: Map<String, Value>,
  ) -> Result<Option<Document>> {
    let sql = format!(
      "UPDATE documents SET
         version    = version + 1,
         data_json  = ?3,
         updated_at = ?4
       WHERE collection = ?1 AND doc_id = ?2 AND version = ?5
       RETURNING {DOCUMENT_COLUMNS}"
    );
    let params = vec![
      SqlValue::Text(collection.to_owned()),
      SqlValue::Text(id.to_owned()),
      SqlValue::Text(encode_data(&data)?),
      SqlValue::Text(encode_dt(Utc::now())),
      SqlValue::Integer(i64::try_from(expected_version).unwrap_or(i64::MAX)),
    ];
    self.returning_one(sql, params).await
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
    let collection = collection.to_owned();
    let id = id.to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![collection, id],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn list(
    &self,
    collection: &str,
    query: &DocumentQuery,
  ) -> Result<Vec<Document>> {
    // Build the statement and its positional parameters together so the
    // placeholders stay in step.
    let mut params = vec![SqlValue::Text(collection.to_owned())];
    let mut sql = format!(
      "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE collection = ?1"
    );

    for (field, value) in &query.filters {
      params.push(SqlValue::Text(json_path(field)?));
      params.push(to_sql_value(value));
      let (p, v) = (params.len() - 1, params.len());
      sql.push_str(&format!(" AND json_extract(data_json, ?{p}) IS ?{v}"));
    }

    match &query.order_by {
      Some((field, direction)) => {
        params.push(SqlValue::Text(json_path(field)?));
        let dir = match direction {
          Direction::Asc => "ASC",
          Direction::Desc => "DESC",
        };
        sql.push_str(&format!(
          " ORDER BY {} {dir}, doc_id",
          order_key(field, params.len())
        ));
      }
      None => sql.push_str(" ORDER BY doc_id"),
    }

    if let Some(limit) = query.limit {
      params.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
      sql.push_str(&format!(" LIMIT ?{}", params.len()));
    }

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params.iter()),
            RawDocument::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }
}
