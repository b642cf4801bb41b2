//! SQLite backend for the Stride document store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every collection shares one table;
//! document bodies are stored as JSON text and queried with SQLite's JSON1
//! functions.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
