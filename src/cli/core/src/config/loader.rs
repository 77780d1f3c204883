/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::WorldforgeConfig;

pub const CONFIG_FILE: &str = "worldforge.toml";

/// Walk upward from `start` to find `worldforge.toml`, like Cargo.toml discovery
pub fn find_config(start: &Path) -> Option<PathBuf> {
  let mut dir = start.canonicalize().ok()?;
  loop {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.is_file() {
      return Some(candidate);
    }
    if !dir.pop() {
      return None;
    }
  }
}

pub fn load_config(path: &Path) -> Result<WorldforgeConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let config: WorldforgeConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  config.validate().with_context(|| format!("invalid {}", path.display()))?;
  Ok(config)
}

/// Project root + parsed config. An explicit path (relative to `cwd`) must exist; otherwise the
/// file is searched upward from `cwd`, and defaults apply when none is found.
pub fn resolve_project(explicit: Option<&Path>, cwd: &Path) -> Result<(PathBuf, WorldforgeConfig)> {
  let path = match explicit {
    Some(p) => Some(cwd.join(p)),
    None => find_config(cwd),
  };
  match path {
    Some(path) => {
      let config = load_config(&path)?;
      let root = path
        .canonicalize()
        .with_context(|| format!("failed to resolve project root of {}", path.display()))?
        .parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("{} has no parent directory", path.display()))?;
      Ok((root, config))
    }
    None => {
      let root =
        cwd.canonicalize().with_context(|| format!("failed to canonicalize {}", cwd.display()))?;
      Ok((root, WorldforgeConfig::default()))
    }
  }
}
