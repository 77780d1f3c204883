/* src/cli/core/src/build/server.rs */

// ServerBundler: node artifact with world imports redirected on disk, the
// physics WASM copied next to it and worlds republished for static serving.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use super::bundler::{BundlePlan, Platform, ResolveRule};
use super::config::BuildConfig;
use super::manifest::BuildManifest;
use super::publish::publish_worlds;
use super::target::BuildTarget;

/// Imports addressing the worlds dir relative to the server source tree
pub const WORLDS_IMPORT_FILTER: &str = r"^\.\./worlds/";
const WORLDS_IMPORT_PREFIX: &str = "../worlds/";

pub struct ServerTarget<'a> {
  config: &'a BuildConfig,
}

impl<'a> ServerTarget<'a> {
  pub fn new(config: &'a BuildConfig) -> Self {
    Self { config }
  }

  fn resolve_rules(&self) -> Result<Vec<ResolveRule>> {
    let mut rules = vec![ResolveRule::redirect(
      WORLDS_IMPORT_FILTER,
      WORLDS_IMPORT_PREFIX,
      &self.config.worlds_dir,
    )?];
    for package in &self.config.externals {
      rules.push(ResolveRule::external(package)?);
    }
    Ok(rules)
  }

  async fn copy_wasm(&self) -> Result<u64> {
    let src = &self.config.wasm;
    let name = src.file_name().with_context(|| format!("{} has no file name", src.display()))?;
    let dest = self.config.out_dir.join(name);
    tokio::fs::copy(src, &dest)
      .await
      .with_context(|| format!("failed to copy {} to {}", src.display(), dest.display()))
  }
}

impl BuildTarget for ServerTarget<'_> {
  fn label(&self) -> &'static str {
    "server"
  }

  fn plan(&self) -> Result<BundlePlan> {
    let cfg = self.config;
    let define = BTreeMap::from([
      ("process.env.CLIENT".to_string(), "false".to_string()),
      ("process.env.SERVER".to_string(), "true".to_string()),
    ]);
    let loader = BTreeMap::from([
      (".js".to_string(), "jsx".to_string()),
      (".glb".to_string(), "file".to_string()),
      (".gltf".to_string(), "file".to_string()),
    ]);
    Ok(BundlePlan {
      label: self.label().to_string(),
      working_dir: cfg.root.clone(),
      entry: cfg.server_entry.clone(),
      outdir: None,
      outfile: Some(cfg.server_artifact()),
      entry_names: None,
      platform: Platform::Node,
      format: "esm".to_string(),
      sourcemap: cfg.server_sourcemap,
      minify: false,
      packages_external: true,
      define,
      loader,
      jsx: None,
      resolve: self.resolve_rules()?,
      metafile: cfg.state_dir.join("server.meta.json"),
    })
  }

  /// WASM first, then worlds; the supervisor only hears about this pass
  /// after both are on disk.
  async fn on_build_complete(&self, _manifest: &BuildManifest) -> Result<()> {
    self.copy_wasm().await?;
    publish_worlds(&self.config.worlds_dir, &self.config.client_out_dir.join("worlds")).await?;
    Ok(())
  }
}
