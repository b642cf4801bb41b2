//! The `ChatService` trait: an external chat backend with users and shared
//! channels.

use std::future::Future;

use serde::Serialize;

use crate::user::Profile;

/// The chat-side identity of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatUser {
  pub id:    String,
  pub name:  String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
}

impl From<&Profile> for ChatUser {
  fn from(p: &Profile) -> Self {
    Self { id: p.id.clone(), name: p.name.clone(), image: p.image_url.clone() }
  }
}

pub trait ChatService: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create the user, or update it in place if it already exists.
  fn upsert_user<'a>(
    &'a self,
    user: &'a ChatUser,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Add a user to a channel. Adding an existing member is not an error.
  fn add_member<'a>(
    &'a self,
    channel_id: &'a str,
    user_id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Mint a client-side token for `user_id`.
  fn user_token(&self, user_id: &str) -> Result<String, Self::Error>;

  /// The public key clients use to connect.
  fn api_key(&self) -> &str;
}
