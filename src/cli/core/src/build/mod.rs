/* src/cli/core/src/build/mod.rs */

pub mod bundler;
pub mod client;
pub mod config;
pub mod manifest;
pub mod publish;
pub mod run;
pub mod server;
pub mod target;
