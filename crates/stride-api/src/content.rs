//! Read-only listings: coaches, articles and categories.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/coaches` | Users with role `coach`, by name |
//! | `GET`  | `/articles` | Optional `?category=<id>`; newest first, at most 50 |
//! | `GET`  | `/categories` | By name |

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use stride_core::{
  store::{ARTICLES, CATEGORIES, Direction, DocumentQuery, DocumentStore, USERS},
  upstream::Upstream,
  user::Role,
};

use crate::{AppState, auth::AuthenticatedUser, docs, error::ApiError};

/// Upper bound on `GET /articles`.
pub const ARTICLE_LIMIT: usize = 50;

/// `GET /coaches`
pub async fn coaches<S, U>(
  State(state): State<AppState<S, U>>,
  _caller: AuthenticatedUser,
) -> Result<Json<Vec<Value>>, ApiError>
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  let query = DocumentQuery::new()
    .filter("role", Role::Coach.as_str())
    .order_by("name", Direction::Asc);
  Ok(Json(docs::list_as(&*state.store, USERS, &query).await?))
}

#[derive(Debug, Deserialize)]
pub struct ArticleParams {
  pub category: Option<String>,
}

/// `GET /articles[?category=<id>]`
pub async fn articles<S, U>(
  State(state): State<AppState<S, U>>,
  _caller: AuthenticatedUser,
  Query(params): Query<ArticleParams>,
) -> Result<Json<Vec<Value>>, ApiError>
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  let mut query = DocumentQuery::new()
    .order_by("publishedAt", Direction::Desc)
    .limit(ARTICLE_LIMIT);
  if let Some(category) = params.category.filter(|c| !c.is_empty()) {
    query = query.filter("category", category);
  }
  Ok(Json(docs::list_as(&*state.store, ARTICLES, &query).await?))
}

/// `GET /categories`
pub async fn categories<S, U>(
  State(state): State<AppState<S, U>>,
  _caller: AuthenticatedUser,
) -> Result<Json<Vec<Value>>, ApiError>
where
  S: DocumentStore + 'static,
  U: Upstream,
{
  let query = DocumentQuery::new().order_by("name", Direction::Asc);
  Ok(Json(docs::list_as(&*state.store, CATEGORIES, &query).await?))
}
