//! Session extractor: resolves the caller from the identity provider's
//! session token.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use stride_core::{
  identity::IdentityProvider, store::DocumentStore, upstream::Upstream,
  user::Caller,
};

use crate::{AppState, error::ApiError};

/// Cookie set by the identity provider's browser SDK.
const SESSION_COOKIE: &str = "__session";

/// Present in a handler's arguments means the request carried a valid
/// session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Caller);

/// The session token from `Authorization: Bearer …`, falling back to the
/// session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty());
  if bearer.is_some() {
    return bearer;
  }

  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value)
    .filter(|t| !t.is_empty())
}

impl<S, U> FromRequestParts<AppState<S, U>> for AuthenticatedUser
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, U>,
  ) -> Result<Self, Self::Rejection> {
    let token = session_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let caller = state
      .upstream
      .identity()
      .verify_session(token)
      .await
      .map_err(ApiError::upstream)?
      .ok_or(ApiError::Unauthorized)?;
    Ok(AuthenticatedUser(caller))
  }
}
