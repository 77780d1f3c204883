/* src/server/core/rust/src/store.rs */

// Content-addressable asset store: name = sha256(bytes) + "." + lowercase extension.
// A name is written at most once; later uploads of the same bytes are no-ops.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::WorldforgeError;
use crate::hash::ContentHash;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAsset {
  pub hash: String,
  pub extension: String,
}

impl StoredAsset {
  pub fn file_name(&self) -> String {
    format!("{}.{}", self.hash, self.extension)
  }
}

/// Whether `put` wrote a new file. Not surfaced to HTTP callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
  Stored,
  AlreadyPresent,
}

/// Extension from an uploaded file name: everything after the last dot
/// (the whole name when there is none), lowercased.
pub fn extension_of(original_name: &str) -> Result<String, WorldforgeError> {
  let raw = original_name.rsplit('.').next().unwrap_or(original_name);
  let ext = raw.to_ascii_lowercase();
  if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
    return Err(WorldforgeError::validation(format!(
      "unsupported file name \"{original_name}\": extension must be alphanumeric"
    )));
  }
  Ok(ext)
}

#[derive(Debug, Clone)]
pub struct AssetStore {
  dir: PathBuf,
  max_bytes: u64,
}

impl AssetStore {
  pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
    Self { dir: dir.into(), max_bytes }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub fn max_bytes(&self) -> u64 {
    self.max_bytes
  }

  /// Fail early once a streamed upload has grown past the limit.
  pub fn check_size(&self, received: u64) -> Result<(), WorldforgeError> {
    if received > self.max_bytes {
      return Err(WorldforgeError::too_large(self.max_bytes));
    }
    Ok(())
  }

  pub async fn ensure_dir(&self) -> Result<(), WorldforgeError> {
    tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
      WorldforgeError::internal(format!("failed to create {}: {e}", self.dir.display()))
    })
  }

  pub fn describe(bytes: &[u8], original_name: &str) -> Result<StoredAsset, WorldforgeError> {
    let extension = extension_of(original_name)?;
    let hash = ContentHash::from_content(bytes).to_hex();
    Ok(StoredAsset { hash, extension })
  }

  pub fn path_of(&self, asset: &StoredAsset) -> PathBuf {
    self.dir.join(asset.file_name())
  }

  /// Store a fully buffered upload. Existing names are never truncated or
  /// rewritten: the bytes land in a temp file inside the store dir and are
  /// moved into place with no-clobber semantics.
  pub async fn put(
    &self,
    bytes: Vec<u8>,
    original_name: &str,
  ) -> Result<(StoredAsset, PutOutcome), WorldforgeError> {
    self.check_size(bytes.len() as u64)?;
    let asset = Self::describe(&bytes, original_name)?;
    let dest = self.path_of(&asset);

    if tokio::fs::try_exists(&dest).await? {
      return Ok((asset, PutOutcome::AlreadyPresent));
    }
    self.ensure_dir().await?;

    let dir = self.dir.clone();
    let outcome = tokio::task::spawn_blocking(move || write_once(&dir, &dest, &bytes))
      .await
      .map_err(|e| WorldforgeError::internal(format!("upload writer panicked: {e}")))??;
    Ok((asset, outcome))
  }
}

fn write_once(dir: &Path, dest: &Path, bytes: &[u8]) -> Result<PutOutcome, WorldforgeError> {
  let mut tmp = tempfile::Builder::new().prefix(".upload-").tempfile_in(dir)?;
  tmp.write_all(bytes)?;
  tmp.as_file().sync_all()?;
  match tmp.persist_noclobber(dest) {
    Ok(_) => Ok(PutOutcome::Stored),
    // Lost a race against an identical upload; the temp file is dropped (and removed) here
    Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
      Ok(PutOutcome::AlreadyPresent)
    }
    Err(e) => Err(WorldforgeError::internal(format!(
      "failed to persist {}: {}",
      dest.display(),
      e.error
    ))),
  }
}

#[cfg(test)]
mod tests;
