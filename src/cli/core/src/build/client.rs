/* src/cli/core/src/build/client.rs */

// ClientBundler: browser artifact with content-hashed names, public files
// copied alongside, and the page template stitched with the script path.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};

use super::bundler::{BundlePlan, JsxOptions, Platform};
use super::config::BuildConfig;
use super::manifest::BuildManifest;
use super::publish::copy_tree;
use super::target::BuildTarget;

pub const SCRIPT_PLACEHOLDER: &str = "{jsFile}";
pub const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";

/// Replace every placeholder occurrence. A template that never references the
/// script cannot load the client, so that is an error.
pub fn render_page(template: &str, script_path: &str, timestamp_ms: u128) -> Result<String> {
  if !template.contains(SCRIPT_PLACEHOLDER) {
    bail!("page template has no {SCRIPT_PLACEHOLDER} placeholder");
  }
  Ok(
    template
      .replace(SCRIPT_PLACEHOLDER, script_path)
      .replace(TIMESTAMP_PLACEHOLDER, &timestamp_ms.to_string()),
  )
}

/// URL path of `file` as served from `public_root`, always `/`-separated.
pub fn public_path(public_root: &Path, file: &Path) -> Result<String> {
  let rel = file.strip_prefix(public_root).with_context(|| {
    format!("{} is outside {}", file.display(), public_root.display())
  })?;
  let parts: Vec<String> =
    rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
  Ok(format!("/{}", parts.join("/")))
}

fn now_ms() -> u128 {
  SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default()
}

pub struct ClientTarget<'a> {
  config: &'a BuildConfig,
}

impl<'a> ClientTarget<'a> {
  pub fn new(config: &'a BuildConfig) -> Self {
    Self { config }
  }

  fn defines(&self) -> BTreeMap<String, String> {
    let mut define = BTreeMap::new();
    define.insert("process.env.CLIENT".to_string(), "true".to_string());
    define.insert("process.env.SERVER".to_string(), "false".to_string());
    for (key, value) in &self.config.public_env {
      let literal = serde_json::Value::String(value.clone()).to_string();
      define.insert(format!("process.env.{key}"), literal);
    }
    define
  }
}

impl BuildTarget for ClientTarget<'_> {
  fn label(&self) -> &'static str {
    "client"
  }

  fn plan(&self) -> Result<BundlePlan> {
    let cfg = self.config;
    Ok(BundlePlan {
      label: self.label().to_string(),
      working_dir: cfg.root.clone(),
      entry: cfg.client_entry.clone(),
      outdir: Some(cfg.client_out_dir.clone()),
      outfile: None,
      entry_names: Some("[name]-[hash]".to_string()),
      platform: Platform::Browser,
      format: "esm".to_string(),
      sourcemap: cfg.client_sourcemap,
      minify: cfg.client_minify,
      packages_external: false,
      define: self.defines(),
      loader: BTreeMap::from([(".js".to_string(), "jsx".to_string())]),
      jsx: Some(JsxOptions { import_source: cfg.jsx_import_source.clone() }),
      resolve: Vec::new(),
      metafile: cfg.state_dir.join("client.meta.json"),
    })
  }

  async fn on_build_complete(&self, manifest: &BuildManifest) -> Result<()> {
    let cfg = self.config;
    copy_tree(&cfg.public_dir, &cfg.client_out_dir, |_| true)
      .await
      .with_context(|| format!("failed to copy public files from {}", cfg.public_dir.display()))?;

    let script = manifest.script_for(&cfg.client_entry)?;
    let script_path = public_path(&cfg.client_out_dir, script)?;
    let template = tokio::fs::read_to_string(&cfg.template)
      .await
      .with_context(|| format!("failed to read {}", cfg.template.display()))?;
    let page = render_page(&template, &script_path, now_ms())?;

    let dest = cfg.client_out_dir.join("index.html");
    tokio::fs::write(&dest, page)
      .await
      .with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(())
  }
}
