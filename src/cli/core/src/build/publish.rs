/* src/cli/core/src/build/publish.rs */

// WorldContentPublisher: mirror each world's script and assets subtree.
// Copies overwrite, so a rerun over unchanged sources is idempotent.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

const ASSETS_DIR: &str = "assets";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
  pub files: usize,
  pub bytes: u64,
}

/// `rel` is relative to the worlds root. Scripts anywhere are kept, as is
/// every file below an `assets` directory.
pub fn is_world_content(rel: &Path) -> bool {
  let is_script = rel.extension().is_some_and(|ext| ext == "js" || ext == "mjs");
  let in_assets =
    rel.parent().is_some_and(|dir| dir.components().any(|c| c.as_os_str() == ASSETS_DIR));
  is_script || in_assets
}

/// Recursively copy files accepted by `keep` (given their path relative to
/// `src`). Directories are created only when something is copied into them.
pub async fn copy_tree(
  src: &Path,
  dest: &Path,
  keep: impl Fn(&Path) -> bool,
) -> Result<PublishReport> {
  let meta =
    tokio::fs::metadata(src).await.with_context(|| format!("{} not found", src.display()))?;
  if !meta.is_dir() {
    bail!("{} is not a directory", src.display());
  }
  tokio::fs::create_dir_all(dest)
    .await
    .with_context(|| format!("failed to create {}", dest.display()))?;

  let mut report = PublishReport::default();
  let mut pending: Vec<PathBuf> = vec![PathBuf::new()];
  while let Some(rel_dir) = pending.pop() {
    let dir = src.join(&rel_dir);
    let mut entries = tokio::fs::read_dir(&dir)
      .await
      .with_context(|| format!("failed to read {}", dir.display()))?;
    while let Some(entry) = entries.next_entry().await? {
      let rel = rel_dir.join(entry.file_name());
      let file_type = entry
        .file_type()
        .await
        .with_context(|| format!("failed to stat {}", entry.path().display()))?;
      if file_type.is_dir() {
        pending.push(rel);
        continue;
      }
      // Linked directories are never followed; a link back up the tree would loop
      if file_type.is_symlink() && is_dir_behind(&entry.path()).await? {
        continue;
      }
      if !keep(&rel) {
        continue;
      }
      let target = dest.join(&rel);
      if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
          .await
          .with_context(|| format!("failed to create {}", parent.display()))?;
      }
      let bytes = tokio::fs::copy(entry.path(), &target).await.with_context(|| {
        format!("failed to copy {} to {}", entry.path().display(), target.display())
      })?;
      report.files += 1;
      report.bytes += bytes;
    }
  }
  Ok(report)
}

async fn is_dir_behind(link: &Path) -> Result<bool> {
  let meta = tokio::fs::metadata(link)
    .await
    .with_context(|| format!("failed to follow {}", link.display()))?;
  Ok(meta.is_dir())
}

/// Publish `worlds_dir` into `dest`. A missing source root fails with the
/// underlying NotFound error in the chain.
pub async fn publish_worlds(worlds_dir: &Path, dest: &Path) -> Result<PublishReport> {
  copy_tree(worlds_dir, dest, is_world_content)
    .await
    .with_context(|| format!("failed to publish worlds from {}", worlds_dir.display()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
  }

  fn listing(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
      for entry in std::fs::read_dir(&dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
          stack.push(path);
        } else {
          let rel = path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
          out.push((rel, std::fs::read(&path).unwrap()));
        }
      }
    }
    out.sort();
    out
  }

  fn sample_worlds(root: &Path) {
    write(root, "vipe/index.js", "export default {}");
    write(root, "vipe/assets/room.glb", "glb");
    write(root, "vipe/assets/textures/wall.png", "png");
    write(root, "vipe/README.md", "notes");
    write(root, "vipe/draft/scratch.txt", "scratch");
    write(root, "arena/index.js", "export default {}");
    write(root, "arena/.DS_Store", "junk");
  }

  #[test]
  fn content_filter() {
    assert!(is_world_content(Path::new("vipe/index.js")));
    assert!(is_world_content(Path::new("vipe/boot.mjs")));
    assert!(is_world_content(Path::new("vipe/assets/room.glb")));
    assert!(is_world_content(Path::new("vipe/assets/deep/nested/tex.ktx2")));
    assert!(!is_world_content(Path::new("vipe/README.md")));
    assert!(!is_world_content(Path::new("vipe/assets.json")));
    assert!(!is_world_content(Path::new("vipe/my-assets/a.png")));
  }

  #[tokio::test]
  async fn publishes_scripts_and_assets_only() {
    let src = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    sample_worlds(src.path());

    let report = publish_worlds(src.path(), &dest.path().join("worlds")).await.unwrap();
    assert_eq!(report.files, 4);

    let names: Vec<String> =
      listing(&dest.path().join("worlds")).into_iter().map(|(name, _)| name).collect();
    assert_eq!(
      names,
      ["arena/index.js", "vipe/assets/room.glb", "vipe/assets/textures/wall.png", "vipe/index.js"]
    );
    assert!(!dest.path().join("worlds/vipe/draft").exists());
  }

  #[tokio::test]
  async fn republish_is_idempotent() {
    let src = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    sample_worlds(src.path());

    publish_worlds(src.path(), dest.path()).await.unwrap();
    let first = listing(dest.path());
    publish_worlds(src.path(), dest.path()).await.unwrap();
    assert_eq!(listing(dest.path()), first);
  }

  #[tokio::test]
  async fn republish_overwrites_changed_files() {
    let src = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    sample_worlds(src.path());
    publish_worlds(src.path(), dest.path()).await.unwrap();

    write(src.path(), "vipe/index.js", "export default { v: 2 }");
    publish_worlds(src.path(), dest.path()).await.unwrap();
    let body = std::fs::read_to_string(dest.path().join("vipe/index.js")).unwrap();
    assert_eq!(body, "export default { v: 2 }");
  }

  #[tokio::test]
  async fn missing_source_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let err =
      publish_worlds(&tmp.path().join("worlds"), &tmp.path().join("out")).await.unwrap_err();
    let io = err.downcast_ref::<std::io::Error>().expect("io error in chain");
    assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    assert!(!tmp.path().join("out").exists());
  }

  #[tokio::test]
  async fn copy_tree_keeps_everything_with_permissive_filter() {
    let src = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    write(src.path(), "index.html", "<html>");
    write(src.path(), "img/logo.svg", "<svg>");

    let report = copy_tree(src.path(), dest.path(), |_| true).await.unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.bytes, 11);
    assert!(dest.path().join("img/logo.svg").is_file());
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn linked_directories_are_not_followed() {
    let src = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    sample_worlds(src.path());
    std::os::unix::fs::symlink(src.path().join("vipe"), src.path().join("vipe/assets/loop"))
      .unwrap();
    std::os::unix::fs::symlink(
      src.path().join("vipe/assets/room.glb"),
      src.path().join("vipe/assets/alias.glb"),
    )
    .unwrap();

    let report = publish_worlds(src.path(), dest.path()).await.unwrap();
    assert_eq!(report.files, 5);
    assert!(!dest.path().join("vipe/assets/loop").exists());
    assert_eq!(std::fs::read_to_string(dest.path().join("vipe/assets/alias.glb")).unwrap(), "glb");
  }
}
