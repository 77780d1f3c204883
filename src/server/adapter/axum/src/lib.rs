/* src/server/adapter/axum/src/lib.rs */

mod error;
mod handler;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::future::BoxFuture;

/// Re-export the asset store core for convenience
pub use worldforge_server;

use worldforge_server::AssetStore;

/// The world-networking collaborator that owns upgraded `/ws` connections.
pub trait WorldNetwork: Send + Sync + 'static {
  fn on_connection(&self, socket: WebSocket) -> BoxFuture<'static, ()>;
}

/// Placeholder network used when no world runtime is attached:
/// keeps the socket open and discards traffic until the peer closes.
pub struct DetachedNetwork;

impl WorldNetwork for DetachedNetwork {
  fn on_connection(&self, mut socket: WebSocket) -> BoxFuture<'static, ()> {
    Box::pin(async move {
      while let Some(Ok(msg)) = socket.recv().await {
        if matches!(msg, Message::Close(_)) {
          break;
        }
      }
    })
  }
}

/// HTTP surface of a running world server: generated page, client script,
/// asset uploads, immutable worlds/assets routes and the WebSocket hand-off.
pub struct WorldforgeServer {
  public_dir: PathBuf,
  worlds_dir: PathBuf,
  store: AssetStore,
  network: Arc<dyn WorldNetwork>,
}

impl WorldforgeServer {
  pub fn new(
    public_dir: impl Into<PathBuf>,
    worlds_dir: impl Into<PathBuf>,
    store: AssetStore,
  ) -> Self {
    Self {
      public_dir: public_dir.into(),
      worlds_dir: worlds_dir.into(),
      store,
      network: Arc::new(DetachedNetwork),
    }
  }

  #[must_use]
  pub fn network(mut self, network: impl WorldNetwork) -> Self {
    self.network = Arc::new(network);
    self
  }

  pub fn into_axum_router(self) -> axum::Router {
    handler::build_router(self.public_dir, self.worlds_dir, self.store, self.network)
  }

  pub async fn serve(
    self,
    listener: tokio::net::TcpListener,
  ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    self.store.ensure_dir().await?;
    let local_addr = listener.local_addr()?;
    println!("running on port {}", local_addr.port());
    axum::serve(listener, self.into_axum_router()).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests;
