//! HTTP clients for the external services behind Stride.
//!
//! | Client              | Service   | Implements |
//! |---------------------|-----------|------------|
//! | [`ClerkClient`]     | Clerk     | [`IdentityProvider`](stride_core::identity::IdentityProvider) |
//! | [`StreamClient`]    | Stream    | [`ChatService`](stride_core::chat::ChatService) |
//! | [`AnthropicClient`] | Anthropic | [`StatementValidator`](stride_core::statement::StatementValidator) |
//!
//! [`Clients`] bundles all three behind [`Upstream`].

pub mod anthropic;
pub mod clerk;
pub mod error;
pub mod stream;

use std::time::Duration;

use stride_core::upstream::Upstream;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use clerk::{ClerkClient, ClerkConfig};
pub use error::{Error, Result};
pub use stream::{StreamClient, StreamConfig};

/// Build the shared [`reqwest::Client`] used by every upstream client.
pub(crate) fn http_client() -> Result<reqwest::Client> {
  Ok(
    reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?,
  )
}

/// Read an error response body for logging, capped so a misbehaving service
/// cannot flood the logs.
pub(crate) async fn status_error(
  service: &'static str,
  resp: reqwest::Response,
) -> Error {
  let status = resp.status();
  let body = resp
    .text()
    .await
    .unwrap_or_default()
    .chars()
    .take(512)
    .collect();
  Error::Status { service, status, body }
}

/// The production set of upstream clients.
#[derive(Clone)]
pub struct Clients {
  pub clerk:     ClerkClient,
  pub stream:    StreamClient,
  pub anthropic: AnthropicClient,
}

impl Upstream for Clients {
  type Identity = ClerkClient;
  type Chat = StreamClient;
  type Validator = AnthropicClient;

  fn identity(&self) -> &ClerkClient { &self.clerk }

  fn chat(&self) -> &StreamClient { &self.stream }

  fn validator(&self) -> &AnthropicClient { &self.anthropic }
}
