/* src/server/core/rust/src/lib.rs */

pub mod errors;
pub mod hash;
pub mod store;

// Re-exports for ergonomic use
pub use errors::WorldforgeError;
pub use hash::ContentHash;
pub use store::{AssetStore, DEFAULT_MAX_UPLOAD_BYTES, PutOutcome, StoredAsset, extension_of};
