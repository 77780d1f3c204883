/* src/cli/core/src/shell.rs */

// Process helpers shared across build, dev and clean.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result, bail};
use tokio::process::Command;

use crate::ui::{self, DIM, RESET};

/// Turn a failed process into an error carrying both stderr and stdout.
fn check_output(label: &str, output: &Output) -> Result<()> {
  if output.status.success() {
    return Ok(());
  }
  let stdout = String::from_utf8_lossy(&output.stdout);
  let stderr = String::from_utf8_lossy(&output.stderr);
  let mut msg = format!("{label} exited with status {}", output.status);
  if !stderr.is_empty() {
    msg.push('\n');
    msg.push_str(stderr.trim_end());
  }
  if !stdout.is_empty() {
    msg.push('\n');
    msg.push_str(stdout.trim_end());
  }
  bail!("{msg}");
}

/// Run a shell command, bail on failure (shows both stdout and stderr on error).
pub(crate) async fn run_command(
  base_dir: &Path,
  command: &str,
  label: &str,
  env: &[(&str, &str)],
) -> Result<()> {
  ui::detail(&format!("{DIM}{command}{RESET}"));
  let output = Command::new("sh")
    .args(["-c", command])
    .current_dir(base_dir)
    .envs(env.iter().copied())
    .kill_on_drop(true)
    .output()
    .await
    .with_context(|| format!("failed to run {label}"))?;
  check_output(label, &output)
}

/// Run a program directly, bypassing sh -c.
pub(crate) async fn run_program(
  base_dir: &Path,
  program: &str,
  args: &[&str],
  label: &str,
) -> Result<()> {
  let output = Command::new(program)
    .args(args)
    .current_dir(base_dir)
    .kill_on_drop(true)
    .output()
    .await
    .with_context(|| format!("failed to run {label} ({program})"))?;
  check_output(label, &output)
}

/// Check if a command exists on PATH. Blocking; call it once at startup.
pub(crate) fn which_exists(cmd: &str) -> bool {
  std::process::Command::new("which")
    .arg(cmd)
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .status()
    .map(|s| s.success())
    .unwrap_or(false)
}
