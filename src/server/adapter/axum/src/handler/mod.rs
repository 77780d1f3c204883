/* src/server/adapter/axum/src/handler/mod.rs */

mod page;
mod socket;
mod statics;
mod upload;

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use worldforge_server::AssetStore;

use crate::WorldNetwork;

#[cfg(test)]
pub(crate) use statics::IMMUTABLE_CACHE_CONTROL;

pub(crate) struct AppState {
  pub public_dir: PathBuf,
  pub store: AssetStore,
  pub network: Arc<dyn WorldNetwork>,
}

pub(crate) fn build_router(
  public_dir: PathBuf,
  worlds_dir: PathBuf,
  store: AssetStore,
  network: Arc<dyn WorldNetwork>,
) -> Router {
  let assets_dir = store.dir().to_path_buf();
  let public = ServeDir::new(&public_dir);
  let state = Arc::new(AppState { public_dir, store, network });

  let router = Router::new()
    .route("/", get(page::handle_index))
    .route("/client.js", get(page::handle_client_script))
    // Size is enforced chunk by chunk in the handler so the limit maps to our 413
    .route("/api/upload", post(upload::handle_upload).layer(DefaultBodyLimit::disable()))
    .route("/ws", get(socket::handle_socket));
  let router = statics::nest_immutable(router, "/worlds", &worlds_dir);
  let router = statics::nest_immutable(router, "/assets", &assets_dir);

  router
    .fallback_service(public)
    .with_state(state)
    .layer(CompressionLayer::new())
    .layer(CorsLayer::permissive())
    .layer(CatchPanicLayer::custom(handle_panic))
}

/// Last-resort handler: a panicking request must not take the listener down.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
  let detail = err
    .downcast_ref::<String>()
    .map(String::as_str)
    .or_else(|| err.downcast_ref::<&str>().copied())
    .unwrap_or("unknown panic");
  eprintln!("request handler panicked: {detail}");
  StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
