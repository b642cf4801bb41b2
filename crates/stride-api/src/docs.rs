//! Typed reads over a [`DocumentStore`].

use serde::de::DeserializeOwned;
use stride_core::store::{Document, DocumentQuery, DocumentStore};

use crate::ApiError;

/// Fetch a document and decode its body as `T`. The raw document is returned
/// alongside for callers that need its version or untyped fields.
pub async fn get_as<T, S>(
  store: &S,
  collection: &str,
  id: &str,
) -> Result<Option<(Document, T)>, ApiError>
where
  T: DeserializeOwned,
  S: DocumentStore,
{
  let Some(doc) = store.get(collection, id).await.map_err(ApiError::store)?
  else {
    return Ok(None);
  };
  let value = doc.decode()?;
  Ok(Some((doc, value)))
}

/// List documents and decode each as `T`, with the document id under `"id"`
/// and timestamp fields normalised.
pub async fn list_as<T, S>(
  store: &S,
  collection: &str,
  query: &DocumentQuery,
) -> Result<Vec<T>, ApiError>
where
  T: DeserializeOwned,
  S: DocumentStore,
{
  store
    .list(collection, query)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|doc| Ok(serde_json::from_value(doc.into_json())?))
    .collect()
}
