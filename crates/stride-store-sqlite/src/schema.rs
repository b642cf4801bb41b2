//! SQL schema for the Stride SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document. `collection` plays the role of a table name.
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT    NOT NULL,
    doc_id      TEXT    NOT NULL,
    version     INTEGER NOT NULL,   -- 1 on insert, +1 on every write
    data_json   TEXT    NOT NULL,   -- JSON object
    created_at  TEXT    NOT NULL,   -- RFC 3339 UTC; server-assigned
    updated_at  TEXT    NOT NULL,
    PRIMARY KEY (collection, doc_id)
);

CREATE INDEX IF NOT EXISTS documents_updated_idx ON documents(collection, updated_at);

PRAGMA user_version = 1;
";
