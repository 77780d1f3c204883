/* src/server/core/rust/src/store/tests.rs */

use super::*;

fn store_in(dir: &Path) -> AssetStore {
  AssetStore::new(dir.join("assets"), DEFAULT_MAX_UPLOAD_BYTES)
}

fn file_names(dir: &Path) -> Vec<String> {
  let mut names: Vec<String> = std::fs::read_dir(dir)
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
    .collect();
  names.sort();
  names
}

#[test]
fn extension_is_lowercased() {
  assert_eq!(extension_of("photo.PNG").unwrap(), "png");
  assert_eq!(extension_of("scene.v2.GLB").unwrap(), "glb");
}

#[test]
fn extension_without_dot_uses_whole_name() {
  assert_eq!(extension_of("README").unwrap(), "readme");
}

#[test]
fn extension_rejects_traversal_and_empty() {
  assert!(extension_of("evil./../x").is_err());
  assert!(extension_of("trailing.").is_err());
  assert_eq!(extension_of("a.p/ng").unwrap_err().status(), 400);
}

#[tokio::test]
async fn scenario_png_upload_then_duplicate() {
  let tmp = tempfile::tempdir().unwrap();
  let store = store_in(tmp.path());
  let bytes = b"0123456789".to_vec();
  let expected = format!("{}.png", ContentHash::from_content(&bytes).to_hex());

  let (first, outcome) = store.put(bytes.clone(), "photo.PNG").await.unwrap();
  assert_eq!(first.file_name(), expected);
  assert_eq!(outcome, PutOutcome::Stored);

  let (second, outcome) = store.put(bytes.clone(), "other.png").await.unwrap();
  assert_eq!(second.file_name(), expected);
  assert_eq!(outcome, PutOutcome::AlreadyPresent);

  assert_eq!(file_names(store.dir()), vec![expected.clone()]);
  assert_eq!(std::fs::read(store.dir().join(&expected)).unwrap(), bytes);
}

#[tokio::test]
async fn duplicate_upload_never_rewrites_existing_file() {
  let tmp = tempfile::tempdir().unwrap();
  let store = store_in(tmp.path());
  let (asset, _) = store.put(b"original".to_vec(), "a.bin").await.unwrap();
  let path = store.path_of(&asset);
  let before = std::fs::metadata(&path).unwrap().modified().unwrap();

  store.put(b"original".to_vec(), "b.BIN").await.unwrap();
  let after = std::fs::metadata(&path).unwrap().modified().unwrap();
  assert_eq!(before, after);
  assert_eq!(std::fs::read(&path).unwrap(), b"original");
}

#[tokio::test]
async fn distinct_content_gets_distinct_names() {
  let tmp = tempfile::tempdir().unwrap();
  let store = store_in(tmp.path());
  let (a, _) = store.put(b"first".to_vec(), "x.glb").await.unwrap();
  let (b, _) = store.put(b"second".to_vec(), "x.glb").await.unwrap();
  assert_ne!(a.file_name(), b.file_name());
  assert_eq!(file_names(store.dir()).len(), 2);
}

#[tokio::test]
async fn same_bytes_different_extension_are_separate_assets() {
  let tmp = tempfile::tempdir().unwrap();
  let store = store_in(tmp.path());
  let (a, _) = store.put(b"same".to_vec(), "x.png").await.unwrap();
  let (b, _) = store.put(b"same".to_vec(), "x.jpg").await.unwrap();
  assert_eq!(a.hash, b.hash);
  assert_ne!(a.file_name(), b.file_name());
}

#[tokio::test]
async fn oversized_upload_is_rejected_without_writing() {
  let tmp = tempfile::tempdir().unwrap();
  let store = AssetStore::new(tmp.path().join("assets"), 4);
  let err = store.put(b"12345".to_vec(), "big.bin").await.unwrap_err();
  assert_eq!(err.status(), 413);
  assert!(!store.dir().exists());
}

#[tokio::test]
async fn invalid_name_is_rejected_without_writing() {
  let tmp = tempfile::tempdir().unwrap();
  let store = store_in(tmp.path());
  let err = store.put(b"data".to_vec(), "bad.ex/t").await.unwrap_err();
  assert_eq!(err.code(), "VALIDATION_ERROR");
  assert!(!store.dir().exists());
}

#[tokio::test]
async fn concurrent_identical_uploads_leave_one_intact_file() {
  let tmp = tempfile::tempdir().unwrap();
  let store = store_in(tmp.path());
  let payload = vec![7u8; 64 * 1024];

  let mut handles = Vec::new();
  for i in 0..8 {
    let store = store.clone();
    let payload = payload.clone();
    handles.push(tokio::spawn(async move { store.put(payload, &format!("f{i}.dat")).await }));
  }
  let mut stored = 0;
  for handle in handles {
    let (_, outcome) = handle.await.unwrap().unwrap();
    if outcome == PutOutcome::Stored {
      stored += 1;
    }
  }
  assert_eq!(stored, 1);

  // Temp files never linger next to the stored asset
  let names = file_names(store.dir());
  assert_eq!(names.len(), 1);
  assert_eq!(std::fs::read(store.dir().join(&names[0])).unwrap(), payload);
}

#[test]
fn check_size_boundary() {
  let store = AssetStore::new("unused", 10);
  assert!(store.check_size(10).is_ok());
  assert_eq!(store.check_size(11).unwrap_err().status(), 413);
}
