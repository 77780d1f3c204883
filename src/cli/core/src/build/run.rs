/* src/cli/core/src/build/run.rs */

// BuildOrchestrator: empty the output dir, publish worlds, then run the
// client and server passes concurrently.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use super::bundler::Bundler;
use super::client::ClientTarget;
use super::config::BuildConfig;
use super::manifest::BuildManifest;
use super::publish::{PublishReport, publish_worlds};
use super::server::ServerTarget;
use super::target::run_pass;
use crate::ui;

/// Remove everything inside `dir`, creating it when absent. The directory
/// itself survives so a running static server keeps its handle.
pub async fn empty_dir(dir: &Path) -> Result<()> {
  let mut entries = match tokio::fs::read_dir(dir).await {
    Ok(entries) => entries,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      return tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()));
    }
    Err(e) => return Err(e).with_context(|| format!("failed to read {}", dir.display())),
  };
  while let Some(entry) = entries.next_entry().await? {
    let path = entry.path();
    let result = if entry.file_type().await?.is_dir() {
      tokio::fs::remove_dir_all(&path).await
    } else {
      tokio::fs::remove_file(&path).await
    };
    result.with_context(|| format!("failed to remove {}", path.display()))?;
  }
  Ok(())
}

/// Shared by one-shot and dev builds; must finish before either pass starts.
pub async fn prepare_output(config: &BuildConfig) -> Result<PublishReport> {
  empty_dir(&config.out_dir).await?;
  publish_worlds(&config.worlds_dir, &config.out_dir.join("worlds")).await
}

pub(crate) fn print_outputs(config: &BuildConfig, manifest: &BuildManifest) {
  for out in manifest.outputs() {
    let rel = out.path.strip_prefix(&config.out_dir).unwrap_or(&out.path);
    ui::detail_ok(&format!("{}  {}", rel.display(), ui::format_size(out.bytes)));
  }
}

pub async fn run_build<B: Bundler>(config: &BuildConfig, bundler: &B) -> Result<()> {
  let started = Instant::now();
  ui::banner("build", &config.project_name);

  // [1/2] Prepare output
  ui::step(1, 2, "Publishing worlds");
  let published = prepare_output(config).await?;
  ui::detail_ok(&format!(
    "{} files \u{00b7} {}",
    published.files,
    ui::format_size(published.bytes)
  ));
  ui::blank();

  // [2/2] Bundle both targets
  ui::step(2, 2, "Bundling client and server");
  let client = ClientTarget::new(config);
  let server = ServerTarget::new(config);
  let (client_manifest, server_manifest) =
    tokio::try_join!(run_pass(&client, bundler), run_pass(&server, bundler))?;
  print_outputs(config, &client_manifest);
  print_outputs(config, &server_manifest);
  ui::blank();

  let elapsed = started.elapsed().as_secs_f64();
  let total = client_manifest.total_bytes() + server_manifest.total_bytes();
  ui::ok(&format!("build complete in {elapsed:.1}s"));
  ui::detail(&format!(
    "{} \u{00b7} {} \u{00b7} {} outputs \u{00b7} {}",
    config.out_dir.display(),
    config.mode(),
    client_manifest.outputs().len() + server_manifest.outputs().len(),
    ui::format_size(total),
  ));
  Ok(())
}
