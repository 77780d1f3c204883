/* src/server/adapter/axum/src/handler/socket.rs */

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::Response;

use super::AppState;

/// Upgrade and hand the socket to the world-networking collaborator.
pub(super) async fn handle_socket(
  State(state): State<Arc<AppState>>,
  ws: WebSocketUpgrade,
) -> Response {
  let network = state.network.clone();
  ws.on_upgrade(move |socket| network.on_connection(socket))
}
