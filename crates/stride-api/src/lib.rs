//! JSON REST API for Stride.
//!
//! Exposes an axum [`Router`] backed by any [`DocumentStore`] and any set of
//! [`Upstream`] services. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stride_api::router(state))
//! ```

pub mod auth;
pub mod chat;
pub mod content;
pub mod docs;
pub mod error;
pub mod identity;
pub mod polls;
pub mod webhook;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use serde_json::{Value, json};
use stride_core::{store::DocumentStore, upstream::Upstream};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Settings the handlers read at request time.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Shared secret for inbound identity-provider webhooks (`whsec_…`).
  pub webhook_secret: String,
  /// Channels every member is added to on chat bootstrap.
  pub chat_channels:  Vec<String>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, U> {
  pub store:    Arc<S>,
  pub upstream: Arc<U>,
  pub config:   Arc<ApiConfig>,
}

impl<S, U> Clone for AppState<S, U> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      upstream: Arc::clone(&self.upstream),
      config:   Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S, U>(state: AppState<S, U>) -> Router<()>
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  Router::new()
    .route("/health", get(health))
    // Listings
    .route("/coaches", get(content::coaches::<S, U>))
    .route("/articles", get(content::articles::<S, U>))
    .route("/categories", get(content::categories::<S, U>))
    // Identity statement
    .route(
      "/identity",
      get(identity::get_current::<S, U>).post(identity::save::<S, U>),
    )
    .route("/identity/validate", post(identity::validate::<S, U>))
    // Polls
    .route("/polls/options", post(polls::add_option::<S, U>))
    .route("/polls/{id}", get(polls::get_one::<S, U>))
    // Chat
    .route("/chat/join", post(chat::join::<S, U>))
    // Webhooks
    .route("/webhooks/clerk", post(webhook::clerk::<S, U>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
