//! Stream Chat: user upserts, channel membership and client tokens.
//!
//! Server-side calls authenticate with a server token (an HS256 JWT over
//! `{"server": true}` signed with the API secret) plus the public API key as
//! a query parameter.

use jsonwebtoken::{EncodingKey, Header, encode};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::json;
use stride_core::chat::{ChatService, ChatUser};

use crate::{Error, Result, http_client, status_error};

/// Channel type used for the shared community channels.
const CHANNEL_TYPE: &str = "messaging";

/// Connection settings for Stream.
#[derive(Debug, Clone)]
pub struct StreamConfig {
  pub api_url:    String,
  pub api_key:    String,
  pub api_secret: String,
}

#[derive(Serialize)]
struct ServerClaims {
  server: bool,
}

#[derive(Serialize)]
struct UserClaims<'a> {
  user_id: &'a str,
}

/// Async client for the Stream Chat REST API. Cheap to clone.
#[derive(Clone)]
pub struct StreamClient {
  client:       Client,
  api_url:      String,
  api_key:      String,
  signing_key:  EncodingKey,
  server_token: String,
}

impl StreamClient {
  pub fn new(config: StreamConfig) -> Result<Self> {
    let signing_key = EncodingKey::from_secret(config.api_secret.as_bytes());
    let server_token =
      encode(&Header::default(), &ServerClaims { server: true }, &signing_key)?;
    Ok(Self {
      client: http_client()?,
      api_url: config.api_url.trim_end_matches('/').to_owned(),
      api_key: config.api_key,
      signing_key,
      server_token,
    })
  }

  fn post(&self, path: &str) -> RequestBuilder {
    self
      .client
      .post(format!("{}{}", self.api_url, path))
      .query(&[("api_key", self.api_key.as_str())])
      .header("Authorization", &self.server_token)
      .header("Stream-Auth-Type", "jwt")
  }

  async fn send(&self, req: RequestBuilder) -> Result<()> {
    let resp = req.send().await?;
    if !resp.status().is_success() {
      return Err(status_error("stream", resp).await);
    }
    Ok(())
  }
}

impl ChatService for StreamClient {
  type Error = Error;

  /// `POST /users`
  async fn upsert_user(&self, user: &ChatUser) -> Result<()> {
    let mut entry = serde_json::to_value(user)?;
    entry["role"] = json!("user");
    let body = json!({ "users": { user.id.as_str(): entry } });
    self.send(self.post("/users").json(&body)).await
  }

  /// `POST /channels/messaging/{channel_id}`
  async fn add_member(&self, channel_id: &str, user_id: &str) -> Result<()> {
    let path = format!("/channels/{CHANNEL_TYPE}/{channel_id}");
    let body = json!({ "add_members": [user_id] });
    self.send(self.post(&path).json(&body)).await
  }

  fn user_token(&self, user_id: &str) -> Result<String> {
    Ok(encode(&Header::default(), &UserClaims { user_id }, &self.signing_key)?)
  }

  fn api_key(&self) -> &str { &self.api_key }
}
