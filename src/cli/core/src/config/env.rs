/* src/cli/core/src/config/env.rs */

// dotenv-flow style layering: .env.<mode>.local > .env.local > .env.<mode> > .env,
// and the real process environment beats every file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Env files for `mode`, highest precedence first. `.env.local` is skipped
/// in test mode so local overrides never leak into test runs.
pub fn env_files(root: &Path, mode: &str) -> Vec<PathBuf> {
  let mut files = vec![root.join(format!(".env.{mode}.local"))];
  if mode != "test" {
    files.push(root.join(".env.local"));
  }
  files.push(root.join(format!(".env.{mode}")));
  files.push(root.join(".env"));
  files
}

/// Snapshot of the environment a build sees. Nothing is written back into
/// the process environment.
pub fn collect_env(
  root: &Path,
  mode: &str,
  process_env: impl IntoIterator<Item = (String, String)>,
) -> Result<BTreeMap<String, String>> {
  let mut merged = BTreeMap::new();
  for file in env_files(root, mode).iter().rev() {
    if !file.is_file() {
      continue;
    }
    let entries =
      dotenvy::from_path_iter(file).with_context(|| format!("failed to read {}", file.display()))?;
    for entry in entries {
      let (key, value) = entry.with_context(|| format!("invalid entry in {}", file.display()))?;
      merged.insert(key, value);
    }
  }
  merged.extend(process_env);
  Ok(merged)
}
