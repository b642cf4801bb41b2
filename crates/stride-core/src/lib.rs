//! Core types and trait definitions for the Stride coaching backend.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! document store, identity provider, chat service and statement validator
//! are all expressed as traits here and implemented by sibling crates.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod chat;
pub mod error;
pub mod identity;
pub mod poll;
pub mod statement;
pub mod store;
pub mod timestamp;
pub mod upstream;
pub mod user;

pub use error::{Error, Result};
