/* src/server/adapter/axum/src/handler/upload.rs */

use std::sync::Arc;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use worldforge_server::{AssetStore, PutOutcome, WorldforgeError};

use super::AppState;
use crate::error::AxumError;

/// Buffer one multipart field, failing as soon as it outgrows the store limit.
async fn read_limited(
  mut field: Field<'_>,
  store: &AssetStore,
) -> Result<Vec<u8>, WorldforgeError> {
  let mut buffer = Vec::new();
  while let Some(chunk) =
    field.chunk().await.map_err(|e| WorldforgeError::validation(e.body_text()))?
  {
    store.check_size((buffer.len() + chunk.len()) as u64)?;
    buffer.extend_from_slice(&chunk);
  }
  Ok(buffer)
}

/// Store the first file field. The response is the same whether the asset
/// was new or already present.
pub(super) async fn handle_upload(
  State(state): State<Arc<AppState>>,
  mut multipart: Multipart,
) -> Result<StatusCode, AxumError> {
  while let Some(field) =
    multipart.next_field().await.map_err(|e| WorldforgeError::validation(e.body_text()))?
  {
    let Some(original_name) = field.file_name().map(str::to_string) else {
      continue;
    };
    let bytes = read_limited(field, &state.store).await?;
    let size = bytes.len();
    let (asset, outcome) = state.store.put(bytes, &original_name).await?;
    if outcome == PutOutcome::Stored {
      println!("stored asset {} ({size} bytes)", asset.file_name());
    }
    return Ok(StatusCode::OK);
  }
  Err(WorldforgeError::validation("upload must contain a file field").into())
}
