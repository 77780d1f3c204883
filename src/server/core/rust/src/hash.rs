/* src/server/core/rust/src/hash.rs */

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 digest of an uploaded buffer. Rendered as 64 lowercase hex chars,
/// which is the stem of every stored asset's file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
  pub fn from_content(data: &[u8]) -> Self {
    Self(Sha256::digest(data).into())
  }

  pub fn to_hex(&self) -> String {
    hex::encode(self.0)
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }
}

impl fmt::Display for ContentHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_hex())
  }
}
