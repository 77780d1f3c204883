/* src/server/adapter/axum/src/error.rs */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use worldforge_server::WorldforgeError;

/// Newtype wrapper to implement `IntoResponse` for `WorldforgeError`.
/// Required because Rust's orphan rule prevents `impl IntoResponse for WorldforgeError`
/// when both types are foreign to this crate.
pub(crate) struct AxumError(pub WorldforgeError);

impl IntoResponse for AxumError {
  fn into_response(self) -> Response {
    let err = self.0;
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
      eprintln!("request failed: {err}");
    }
    let body = serde_json::json!({
      "ok": false,
      "error": {
        "code": err.code(),
        "message": err.message(),
      }
    });
    (status, axum::Json(body)).into_response()
  }
}

impl From<WorldforgeError> for AxumError {
  fn from(err: WorldforgeError) -> Self {
    Self(err)
  }
}
