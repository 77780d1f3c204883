/* src/cli/core/src/build/manifest.rs */

// Outputs of one bundling pass, read from an esbuild-format metafile.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

#[derive(Deserialize)]
struct RawMetafile {
  #[serde(default)]
  outputs: BTreeMap<String, RawOutput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOutput {
  entry_point: Option<String>,
  #[serde(default)]
  bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
  /// Absolute path of the emitted file
  pub path: PathBuf,
  pub entry_point: Option<String>,
  pub bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct BuildManifest {
  outputs: Vec<BuildOutput>,
}

fn normalize_entry(entry: &str) -> &str {
  entry.strip_prefix("./").unwrap_or(entry)
}

impl BuildManifest {
  /// Output keys are relative to the bundler's working directory (`root`).
  pub fn parse(json: &str, root: &Path) -> Result<Self> {
    let raw: RawMetafile = serde_json::from_str(json).context("failed to parse metafile")?;
    let outputs = raw
      .outputs
      .into_iter()
      .map(|(key, out)| BuildOutput {
        path: root.join(key),
        entry_point: out.entry_point,
        bytes: out.bytes,
      })
      .collect();
    Ok(Self { outputs })
  }

  pub async fn from_metafile(path: &Path, root: &Path) -> Result<Self> {
    let content = tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("bundler produced no metafile at {}", path.display()))?;
    Self::parse(&content, root)
  }

  pub fn outputs(&self) -> &[BuildOutput] {
    &self.outputs
  }

  pub fn outputs_for<'a, 'b>(
    &'a self,
    entry: &'b str,
  ) -> impl Iterator<Item = &'a BuildOutput> + use<'a, 'b> {
    let wanted = normalize_entry(entry);
    self
      .outputs
      .iter()
      .filter(move |out| out.entry_point.as_deref().map(normalize_entry) == Some(wanted))
  }

  /// The single `.js` output compiled from `entry`. Source maps and
  /// file-loader outputs never count.
  pub fn script_for(&self, entry: &str) -> Result<&Path> {
    let mut scripts = self
      .outputs_for(entry)
      .filter(|out| out.path.extension().is_some_and(|ext| ext == "js"))
      .map(|out| out.path.as_path());
    let Some(first) = scripts.next() else {
      bail!("bundler emitted no script for entry {entry}");
    };
    if let Some(second) = scripts.next() {
      bail!(
        "bundler emitted more than one script for entry {entry}: {} and {}",
        first.display(),
        second.display()
      );
    }
    Ok(first)
  }

  pub fn total_bytes(&self) -> u64 {
    self.outputs.iter().map(|out| out.bytes).sum()
  }
}
