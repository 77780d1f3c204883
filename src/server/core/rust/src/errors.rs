/* src/server/core/rust/src/errors.rs */

use std::fmt;

#[derive(Debug)]
pub struct WorldforgeError {
  code: String,
  message: String,
  status: u16,
}

fn default_status(code: &str) -> u16 {
  match code {
    "VALIDATION_ERROR" => 400,
    "NOT_FOUND" => 404,
    "PAYLOAD_TOO_LARGE" => 413,
    "INTERNAL_ERROR" => 500,
    _ => 500,
  }
}

impl WorldforgeError {
  pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
    Self { code: code.into(), message: message.into(), status }
  }

  pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
    let code = code.into();
    let status = default_status(&code);
    Self { code, message: message.into(), status }
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::with_code("VALIDATION_ERROR", msg)
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::with_code("NOT_FOUND", msg)
  }

  pub fn too_large(limit: u64) -> Self {
    Self::with_code("PAYLOAD_TOO_LARGE", format!("upload exceeds the {limit} byte limit"))
  }

  pub fn internal(msg: impl Into<String>) -> Self {
    Self::with_code("INTERNAL_ERROR", msg)
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn status(&self) -> u16 {
    self.status
  }
}

impl fmt::Display for WorldforgeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.code, self.message)
  }
}

impl std::error::Error for WorldforgeError {}

impl From<std::io::Error> for WorldforgeError {
  fn from(err: std::io::Error) -> Self {
    Self::internal(err.to_string())
  }
}
