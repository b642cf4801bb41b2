//! Bundles the external collaborators a request handler may reach.

use crate::{
  chat::ChatService, identity::IdentityProvider,
  statement::StatementValidator,
};

/// The set of external services behind the API, other than the document
/// store. Implemented by the real HTTP clients and by test fakes.
pub trait Upstream: Send + Sync + 'static {
  type Identity: IdentityProvider;
  type Chat: ChatService;
  type Validator: StatementValidator;

  fn identity(&self) -> &Self::Identity;
  fn chat(&self) -> &Self::Chat;
  fn validator(&self) -> &Self::Validator;
}
