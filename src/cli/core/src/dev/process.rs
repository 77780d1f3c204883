/* src/cli/core/src/dev/process.rs */

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::ui::{CYAN, DIM, MAGENTA, RESET};

pub(super) struct ChildProcess {
  pub label: &'static str,
  pub child: tokio::process::Child,
}

/// Spawn a program directly with piped output. The child dies with its handle.
pub(super) fn spawn_binary<'a>(
  label: &'static str,
  program: &str,
  args: &[&str],
  base_dir: &Path,
  env_vars: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<ChildProcess> {
  let mut cmd = Command::new(program);
  cmd.args(args);
  cmd.current_dir(base_dir);
  cmd.stdout(std::process::Stdio::piped());
  cmd.stderr(std::process::Stdio::piped());
  cmd.kill_on_drop(true);
  cmd.envs(env_vars);
  let child = cmd.spawn().with_context(|| format!("failed to start {program}"))?;
  Ok(ChildProcess { label, child })
}

pub(super) fn label_color(label: &str) -> &'static str {
  match label {
    "server" => CYAN,
    "client" => MAGENTA,
    _ => DIM,
  }
}

/// Pipe stdout/stderr, prefixed with a colored label
pub(super) fn pipe_output(proc: &mut ChildProcess) {
  let label = proc.label;
  let color = label_color(label);

  if let Some(stdout) = proc.child.stdout.take() {
    let reader = BufReader::new(stdout);
    tokio::spawn(async move {
      let mut lines = reader.lines();
      while let Ok(Some(line)) = lines.next_line().await {
        println!("  {color}{DIM}{label:>8}{RESET} {line}");
      }
    });
  }

  if let Some(stderr) = proc.child.stderr.take() {
    let reader = BufReader::new(stderr);
    tokio::spawn(async move {
      let mut lines = reader.lines();
      while let Ok(Some(line)) = lines.next_line().await {
        eprintln!("  {color}{DIM}{label:>8}{RESET} {line}");
      }
    });
  }
}
