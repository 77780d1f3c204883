/* src/cli/core/src/clean.rs */

// `worldforge clean`: removes build output and bundler state, then runs
// user-defined cleanup commands.

use std::path::Path;

use anyhow::{Context, Result};

use crate::build::config::BuildConfig;
use crate::shell::run_command;
use crate::ui;

pub async fn run_clean(config: &BuildConfig) -> Result<()> {
  ui::arrow("cleaning project");

  delete_dir_if_exists(&config.out_dir).await?;
  delete_dir_if_exists(&config.state_dir).await?;
  run_clean_commands(&config.clean_commands, &config.root).await?;

  ui::ok("clean complete");
  Ok(())
}

async fn delete_dir_if_exists(path: &Path) -> Result<()> {
  match tokio::fs::remove_dir_all(path).await {
    Ok(()) => {
      ui::detail(&format!("deleted {}", path.display()));
      Ok(())
    }
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
  }
}

async fn run_clean_commands(commands: &[String], cwd: &Path) -> Result<()> {
  for cmd in commands {
    run_command(cwd, cmd, "clean", &[]).await?;
  }
  Ok(())
}
