/* src/cli/core/src/serve.rs */

// `worldforge serve`: host a built output tree with the world HTTP surface.

use anyhow::{Context, Result, anyhow};
use worldforge_axum::WorldforgeServer;
use worldforge_server::AssetStore;

use crate::build::config::BuildConfig;
use crate::ui::{self, BOLD, GREEN, RESET};

pub async fn run_serve(config: &BuildConfig) -> Result<()> {
  let index = config.client_out_dir.join("index.html");
  if !index.is_file() {
    ui::warn(&format!("{} not found, run `worldforge build` first", index.display()));
  }

  let store = AssetStore::new(&config.assets_dir, config.max_upload_bytes);
  let server =
    WorldforgeServer::new(&config.client_out_dir, config.client_out_dir.join("worlds"), store);

  let addr = format!("0.0.0.0:{}", config.port);
  let listener = tokio::net::TcpListener::bind(&addr)
    .await
    .with_context(|| format!("failed to launch on port {}", config.port))?;

  ui::banner("serve", &config.project_name);
  println!("  {GREEN}\u{2192}{RESET} {BOLD}http://localhost:{}{RESET}", config.port);
  println!();

  server.serve(listener).await.map_err(|e| anyhow!(e)).context("server stopped")
}
