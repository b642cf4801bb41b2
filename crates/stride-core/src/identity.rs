//! The `IdentityProvider` trait: the external service of record for user
//! accounts, sessions and role claims.

use std::future::Future;

use crate::user::{Caller, Profile};

pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve a session token to the caller it belongs to.
  ///
  /// Returns `None` for tokens that are malformed, expired or not signed by
  /// the provider. `Err` is reserved for failures to reach a verdict.
  fn verify_session<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<Caller>, Self::Error>> + Send + 'a;

  /// Fetch the current profile of a user.
  fn get_profile<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + 'a;
}
