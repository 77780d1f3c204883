/* src/server/adapter/axum/src/handler/page.rs */

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use worldforge_server::WorldforgeError;

use super::AppState;
use crate::error::AxumError;

async fn read_public(state: &AppState, name: &str) -> Result<Vec<u8>, WorldforgeError> {
  let path = state.public_dir.join(name);
  match tokio::fs::read(&path).await {
    Ok(bytes) => Ok(bytes),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      Err(WorldforgeError::not_found(format!("{name} has not been built")))
    }
    Err(e) => Err(WorldforgeError::internal(format!("failed to read {}: {e}", path.display()))),
  }
}

/// The generated page; the client bundler rewrites it on every successful pass.
pub(super) async fn handle_index(
  State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AxumError> {
  let html = read_public(&state, "index.html").await?;
  Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html))
}

pub(super) async fn handle_client_script(
  State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AxumError> {
  let js = read_public(&state, "client.js").await?;
  Ok(([(header::CONTENT_TYPE, "application/javascript")], js))
}
