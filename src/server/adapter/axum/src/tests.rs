/* src/server/adapter/axum/src/tests.rs */

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;
use worldforge_server::ContentHash;

use super::*;
use crate::handler::IMMUTABLE_CACHE_CONTROL;

const BOUNDARY: &str = "worldforge-test-boundary";

fn fixture(max_bytes: u64) -> (tempfile::TempDir, axum::Router) {
  let tmp = tempfile::tempdir().unwrap();
  let public = tmp.path().join("build/public");
  let worlds = public.join("worlds");
  std::fs::create_dir_all(worlds.join("vipe/assets")).unwrap();
  std::fs::write(public.join("index.html"), "<script src=\"/index-ABC.js\"></script>").unwrap();
  std::fs::write(public.join("client.js"), "console.log('client')").unwrap();
  std::fs::write(public.join("style.css"), "body{}").unwrap();
  std::fs::write(worlds.join("vipe/scene.js"), "export class World {}").unwrap();
  std::fs::write(worlds.join("vipe/assets/room.glb"), [0u8, 1, 2, 3]).unwrap();

  let store = AssetStore::new(tmp.path().join("assets"), max_bytes);
  std::fs::create_dir_all(store.dir()).unwrap();
  std::fs::write(store.dir().join("cafe.png"), [9u8; 4]).unwrap();

  let router = WorldforgeServer::new(&public, &worlds, store).into_axum_router();
  (tmp, router)
}

fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
  let mut body = Vec::new();
  body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
  body.extend_from_slice(
    format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
      .as_bytes(),
  );
  body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
  body.extend_from_slice(content);
  body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
  body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri("/api/upload")
    .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
    .body(Body::from(body))
    .unwrap()
}

fn get(uri: &str) -> Request<Body> {
  Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
  response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

fn stored_names(dir: &Path) -> Vec<String> {
  let mut names: Vec<String> = std::fs::read_dir(dir)
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
    .collect();
  names.sort();
  names
}

#[tokio::test]
async fn root_serves_generated_page() {
  let (_tmp, router) = fixture(1024);
  let response = router.oneshot(get("/")).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
  assert!(content_type.starts_with("text/html"));
  let body = body_bytes(response).await;
  assert!(String::from_utf8(body).unwrap().contains("/index-ABC.js"));
}

#[tokio::test]
async fn client_script_has_javascript_type() {
  let (_tmp, router) = fixture(1024);
  let response = router.oneshot(get("/client.js")).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(response.headers()[header::CONTENT_TYPE], "application/javascript");
}

#[tokio::test]
async fn missing_page_is_not_found() {
  let (tmp, router) = fixture(1024);
  std::fs::remove_file(tmp.path().join("build/public/index.html")).unwrap();
  let response = router.oneshot(get("/")).await.unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn worlds_are_served_immutable() {
  let (_tmp, router) = fixture(1024);
  let response = router.oneshot(get("/worlds/vipe/assets/room.glb")).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(response.headers()[header::CACHE_CONTROL], IMMUTABLE_CACHE_CONTROL);
  assert!(response.headers().contains_key(header::EXPIRES));
  assert_eq!(body_bytes(response).await, vec![0u8, 1, 2, 3]);
}

#[tokio::test]
async fn stored_assets_are_served_immutable() {
  let (_tmp, router) = fixture(1024);
  let response = router.oneshot(get("/assets/cafe.png")).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(
    response.headers()[header::CACHE_CONTROL],
    "public, max-age=31536000, immutable"
  );
}

#[tokio::test]
async fn other_paths_fall_back_to_public_dir() {
  let (_tmp, router) = fixture(1024);
  let response = router.oneshot(get("/style.css")).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert!(!response.headers().contains_key(header::CACHE_CONTROL));
}

#[tokio::test]
async fn upload_stores_by_content_hash_once() {
  let (tmp, router) = fixture(1024);
  let content = b"0123456789";
  let expected = format!("{}.png", ContentHash::from_content(content));

  let response =
    router.clone().oneshot(upload_request(multipart_body("photo.PNG", content))).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  assert!(body_bytes(response).await.is_empty());

  let response =
    router.oneshot(upload_request(multipart_body("other.png", content))).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let assets = tmp.path().join("assets");
  let names = stored_names(&assets);
  assert_eq!(names.iter().filter(|n| **n == expected).count(), 1);
  assert_eq!(std::fs::read(assets.join(&expected)).unwrap(), content);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
  let (tmp, router) = fixture(8);
  let response =
    router.oneshot(upload_request(multipart_body("big.bin", &[1u8; 64]))).await.unwrap();
  assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
  assert_eq!(stored_names(&tmp.path().join("assets")), vec!["cafe.png".to_string()]);
}

#[tokio::test]
async fn upload_without_file_is_bad_request() {
  let (_tmp, router) = fixture(1024);
  let body = format!(
    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\n\
     hello\r\n--{BOUNDARY}--\r\n"
  );
  let response = router.oneshot(upload_request(body.into_bytes())).await.unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn socket_route_requires_upgrade() {
  let (_tmp, router) = fixture(1024);
  let response = router.oneshot(get("/ws")).await.unwrap();
  assert!(response.status().is_client_error());
}
