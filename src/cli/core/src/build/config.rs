/* src/cli/core/src/build/config.rs */

// Immutable build settings, resolved once from worldforge.toml plus an
// environment snapshot and shared by reference with every component.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::config::{WorldforgeConfig, collect_env};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundlerMode {
  /// Embedded esbuild runner, executed with node (or bun when available)
  BuiltIn,
  Custom { command: String },
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
  pub project_name: String,
  pub root: PathBuf,
  pub dev: bool,
  pub worlds_dir: PathBuf,
  pub out_dir: PathBuf,
  /// `<out>/public`, the browser artifact and everything served statically
  pub client_out_dir: PathBuf,
  pub public_dir: PathBuf,
  pub template: PathBuf,
  /// `<root>/.worldforge`, bundle plans, metafiles and the runner script
  pub state_dir: PathBuf,
  pub client_entry: String,
  pub client_sourcemap: bool,
  pub client_minify: bool,
  pub jsx_import_source: Option<String>,
  pub public_env: BTreeMap<String, String>,
  pub server_entry: String,
  pub server_sourcemap: bool,
  pub externals: Vec<String>,
  pub wasm: PathBuf,
  pub runtime: String,
  pub port: u16,
  pub assets_dir: PathBuf,
  pub max_upload_bytes: u64,
  pub env: BTreeMap<String, String>,
  pub bundler_mode: BundlerMode,
  pub debounce: Duration,
  pub grace: Duration,
  pub clean_commands: Vec<String>,
}

fn mode_name(dev: bool) -> &'static str {
  if dev { "development" } else { "production" }
}

impl BuildConfig {
  /// Which `.env.<mode>` files were read.
  pub fn mode(&self) -> &'static str {
    mode_name(self.dev)
  }

  /// Load `.env` files for the build mode, overlay the process environment and resolve.
  pub fn load(config: &WorldforgeConfig, root: &Path, dev: bool) -> Result<Self> {
    let env = collect_env(root, mode_name(dev), std::env::vars())?;
    Self::resolve(config, root, env, dev)
  }

  pub fn resolve(
    config: &WorldforgeConfig,
    root: &Path,
    env: BTreeMap<String, String>,
    dev: bool,
  ) -> Result<Self> {
    let paths = &config.paths;
    let out_dir = root.join(&paths.out_dir);
    if root.starts_with(&out_dir) {
      bail!(
        "paths.out_dir ({}) must not contain the project root, it is emptied on every build",
        paths.out_dir
      );
    }

    let port = match env.get("PORT") {
      Some(raw) => {
        raw.trim().parse::<u16>().with_context(|| format!("invalid PORT value \"{raw}\""))?
      }
      None => config.server.port,
    };

    let Some(max_upload_bytes) = config.server.max_upload_mb.checked_mul(1024 * 1024) else {
      bail!("server.max_upload_mb ({}) is too large", config.server.max_upload_mb);
    };

    let prefix = &config.client.public_env_prefix;
    let public_env: BTreeMap<String, String> = env
      .iter()
      .filter(|(key, _)| key.starts_with(prefix.as_str()))
      .map(|(key, value)| (key.clone(), value.clone()))
      .collect();

    let bundler_mode = match &config.bundler.command {
      Some(command) => BundlerMode::Custom { command: command.clone() },
      None => BundlerMode::BuiltIn,
    };

    Ok(Self {
      project_name: config.project.name.clone(),
      root: root.to_path_buf(),
      dev,
      worlds_dir: root.join(&paths.worlds_dir),
      client_out_dir: out_dir.join("public"),
      out_dir,
      public_dir: root.join(&paths.public_dir),
      template: root.join(&paths.template),
      state_dir: root.join(".worldforge"),
      client_entry: config.client.entry.clone(),
      client_sourcemap: config.client.sourcemap,
      client_minify: config.client.minify,
      jsx_import_source: config.client.jsx_import_source.clone(),
      public_env,
      server_entry: config.server.entry.clone(),
      server_sourcemap: config.server.sourcemap,
      externals: config.server.externals.clone(),
      wasm: root.join(&config.server.wasm),
      runtime: config.server.runtime.clone(),
      port,
      assets_dir: root.join(&config.server.assets_dir),
      max_upload_bytes,
      env,
      bundler_mode,
      debounce: Duration::from_millis(config.dev.debounce_ms),
      grace: Duration::from_millis(config.dev.grace_ms),
      clean_commands: config.clean.commands.clone(),
    })
  }

  /// Where the server artifact lands; the supervisor runs this file.
  pub fn server_artifact(&self) -> PathBuf {
    self.out_dir.join("index.js")
  }
}
