/* src/cli/core/src/config/tests/mod.rs */

use super::env::env_files;
use super::loader::{CONFIG_FILE, find_config};
use super::*;
