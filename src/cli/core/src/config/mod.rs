/* src/cli/core/src/config/mod.rs */

mod env;
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use env::collect_env;
pub use loader::resolve_project;
pub use types::WorldforgeConfig;
