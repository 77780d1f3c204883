/* src/cli/core/src/main.rs */

mod build;
mod clean;
mod config;
mod dev;
mod serve;
mod shell;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use build::bundler::EsbuildBundler;
use build::config::BuildConfig;
use config::resolve_project;

#[derive(Parser)]
#[command(name = "worldforge", about = "Worldforge build and dev orchestrator")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Build the client and server bundles and publish worlds
  Build {
    /// Keep rebuilding on change and supervise the server process
    #[arg(long)]
    dev: bool,
    /// Path to worldforge.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Same as `build --dev`
  Dev {
    /// Path to worldforge.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Serve a built output tree (page, worlds, assets, uploads, websocket)
  Serve {
    /// Path to worldforge.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Remove build output and bundler state, and run cleanup commands
  Clean {
    /// Path to worldforge.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

/// Warn if `.worldforge/` is not covered by any gitignore rule
fn warn_state_not_gitignored(base_dir: &Path) {
  use std::process::Command;
  let output = Command::new("git")
    .args(["check-ignore", "-q", ".worldforge"])
    .current_dir(base_dir)
    .output();
  // exit 1 = not ignored; 0 = ignored; anything else = not a git repo or no git
  if let Ok(o) = output
    && o.status.code() == Some(1)
  {
    ui::warn(".worldforge/ is not in .gitignore -- consider adding it");
  }
}

fn load_build_config(explicit: Option<PathBuf>, dev: bool) -> Result<BuildConfig> {
  let cwd = std::env::current_dir().context("failed to get cwd")?;
  let (root, config) = resolve_project(explicit.as_deref(), &cwd)?;
  BuildConfig::load(&config, &root, dev)
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Command::Build { dev: false, config } => {
      let build_config = load_build_config(config, false)?;
      warn_state_not_gitignored(&build_config.root);
      let bundler = EsbuildBundler::new(&build_config);
      build::run::run_build(&build_config, &bundler).await?;
    }
    Command::Build { dev: true, config } | Command::Dev { config } => {
      let build_config = load_build_config(config, true)?;
      warn_state_not_gitignored(&build_config.root);
      let bundler = EsbuildBundler::new(&build_config);
      dev::run_dev(&build_config, &bundler).await?;
    }
    Command::Serve { config } => {
      let build_config = load_build_config(config, false)?;
      serve::run_serve(&build_config).await?;
    }
    Command::Clean { config } => {
      let build_config = load_build_config(config, false)?;
      clean::run_clean(&build_config).await?;
    }
  }

  Ok(())
}
