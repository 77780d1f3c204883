/* src/cli/core/src/config/types.rs */

use anyhow::{Result, bail};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldforgeConfig {
  #[serde(default)]
  pub project: ProjectConfig,
  #[serde(default)]
  pub paths: PathsSection,
  #[serde(default)]
  pub client: ClientSection,
  #[serde(default)]
  pub server: ServerSection,
  #[serde(default)]
  pub bundler: BundlerSection,
  #[serde(default)]
  pub dev: DevSection,
  #[serde(default)]
  pub clean: CleanSection,
}

impl WorldforgeConfig {
  pub fn validate(&self) -> Result<()> {
    if self.client.entry.trim().is_empty() {
      bail!("client.entry must not be empty");
    }
    if self.server.entry.trim().is_empty() {
      bail!("server.entry must not be empty");
    }
    if self.client.public_env_prefix.is_empty() {
      bail!("client.public_env_prefix must not be empty");
    }
    if self.server.max_upload_mb == 0 {
      bail!("server.max_upload_mb must be greater than 0");
    }
    if self.server.runtime.trim().is_empty() {
      bail!("server.runtime must not be empty");
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
  #[serde(default = "default_project_name")]
  pub name: String,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self { name: default_project_name() }
  }
}

fn default_project_name() -> String {
  "worldforge".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
  #[serde(default = "default_worlds_dir")]
  pub worlds_dir: String,
  #[serde(default = "default_out_dir")]
  pub out_dir: String,
  #[serde(default = "default_public_dir")]
  pub public_dir: String,
  #[serde(default = "default_template")]
  pub template: String,
}

impl Default for PathsSection {
  fn default() -> Self {
    Self {
      worlds_dir: default_worlds_dir(),
      out_dir: default_out_dir(),
      public_dir: default_public_dir(),
      template: default_template(),
    }
  }
}

fn default_worlds_dir() -> String {
  "worlds".to_string()
}

fn default_out_dir() -> String {
  "build".to_string()
}

fn default_public_dir() -> String {
  "src/client/public".to_string()
}

fn default_template() -> String {
  "src/client/public/index.html".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
  #[serde(default = "default_client_entry")]
  pub entry: String,
  #[serde(default = "default_public_env_prefix")]
  pub public_env_prefix: String,
  #[serde(default = "default_true")]
  pub sourcemap: bool,
  #[serde(default)]
  pub minify: bool,
  pub jsx_import_source: Option<String>,
}

impl Default for ClientSection {
  fn default() -> Self {
    Self {
      entry: default_client_entry(),
      public_env_prefix: default_public_env_prefix(),
      sourcemap: true,
      minify: false,
      jsx_import_source: None,
    }
  }
}

fn default_client_entry() -> String {
  "src/client/index.js".to_string()
}

fn default_public_env_prefix() -> String {
  "PUBLIC_".to_string()
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_server_entry")]
  pub entry: String,
  #[serde(default = "default_externals")]
  pub externals: Vec<String>,
  #[serde(default = "default_wasm")]
  pub wasm: String,
  #[serde(default = "default_runtime")]
  pub runtime: String,
  #[serde(default = "default_port")]
  pub port: u16,
  #[serde(default = "default_assets_dir")]
  pub assets_dir: String,
  #[serde(default = "default_max_upload_mb")]
  pub max_upload_mb: u64,
  #[serde(default = "default_true")]
  pub sourcemap: bool,
}

impl Default for ServerSection {
  fn default() -> Self {
    Self {
      entry: default_server_entry(),
      externals: default_externals(),
      wasm: default_wasm(),
      runtime: default_runtime(),
      port: default_port(),
      assets_dir: default_assets_dir(),
      max_upload_mb: default_max_upload_mb(),
      sourcemap: true,
    }
  }
}

fn default_server_entry() -> String {
  "src/server/index.js".to_string()
}

fn default_externals() -> Vec<String> {
  vec!["three".to_string()]
}

fn default_wasm() -> String {
  "src/server/physx/physx-js-webidl.wasm".to_string()
}

fn default_runtime() -> String {
  "node".to_string()
}

fn default_port() -> u16 {
  3000
}

fn default_assets_dir() -> String {
  "assets".to_string()
}

fn default_max_upload_mb() -> u64 {
  100
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundlerSection {
  /// Replaces the built-in esbuild runner. Receives the plan path in `WORLDFORGE_PLAN`.
  pub command: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DevSection {
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms: u64,
  #[serde(default = "default_grace_ms")]
  pub grace_ms: u64,
}

impl Default for DevSection {
  fn default() -> Self {
    Self { debounce_ms: default_debounce_ms(), grace_ms: default_grace_ms() }
  }
}

fn default_debounce_ms() -> u64 {
  300
}

fn default_grace_ms() -> u64 {
  3000
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleanSection {
  #[serde(default)]
  pub commands: Vec<String>,
}
