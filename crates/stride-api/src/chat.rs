//! `POST /chat/join`: provision the caller in the chat service.
//!
//! The caller's profile is fetched from the identity provider, mirrored as a
//! chat user, and added to every configured channel. Channel joins are
//! independent of each other; a failed join is reported, not fatal.

use axum::{Json, extract::State};
use serde::Serialize;
use stride_core::{
  chat::{ChatService, ChatUser},
  identity::IdentityProvider,
  store::DocumentStore,
  upstream::Upstream,
};

use crate::{AppState, auth::AuthenticatedUser, error::ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
  pub user_id:         String,
  pub token:           String,
  pub api_key:         String,
  pub joined_channels: Vec<String>,
  pub failed_channels: Vec<String>,
}

/// `POST /chat/join`
pub async fn join<S, U>(
  State(state): State<AppState<S, U>>,
  AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<JoinResponse>, ApiError>
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  let chat = state.upstream.chat();

  let profile = state
    .upstream
    .identity()
    .get_profile(&caller.user_id)
    .await
    .map_err(ApiError::upstream)?;
  let user = ChatUser::from(&profile);
  chat.upsert_user(&user).await.map_err(ApiError::upstream)?;

  let mut joined_channels = Vec::new();
  let mut failed_channels = Vec::new();
  for channel in &state.config.chat_channels {
    match chat.add_member(channel, &user.id).await {
      Ok(()) => joined_channels.push(channel.clone()),
      Err(e) => {
        tracing::warn!(
          channel = %channel,
          user_id = %user.id,
          error = %e,
          "failed to join chat channel"
        );
        failed_channels.push(channel.clone());
      }
    }
  }

  let token = chat.user_token(&user.id).map_err(ApiError::upstream)?;
  Ok(Json(JoinResponse {
    user_id: user.id,
    token,
    api_key: chat.api_key().to_owned(),
    joined_channels,
    failed_channels,
  }))
}
