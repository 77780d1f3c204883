/* src/cli/core/src/dev/supervisor.rs */

// Owns at most one server process. Each restart stops the previous child
// (SIGTERM, bounded grace, then kill) before the next one is spawned, so two
// servers never race for the same port.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Child;

use super::process::{ChildProcess, pipe_output, spawn_binary};
use crate::build::config::BuildConfig;

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
  /// Program that runs the artifact, e.g. `node`
  pub runtime: String,
  pub artifact: PathBuf,
  pub working_dir: PathBuf,
  pub env: Vec<(String, String)>,
  pub grace: Duration,
}

impl SupervisorConfig {
  pub fn from_build(config: &BuildConfig) -> Self {
    let mut env: Vec<(String, String)> = config
      .env
      .iter()
      .filter(|(key, _)| *key != "PORT")
      .map(|(key, value)| (key.clone(), value.clone()))
      .collect();
    env.push(("PORT".to_string(), config.port.to_string()));
    Self {
      runtime: config.runtime.clone(),
      artifact: config.server_artifact(),
      working_dir: config.root.clone(),
      env,
      grace: config.grace,
    }
  }
}

enum State {
  Idle,
  Running(ChildProcess),
}

pub struct DevSupervisor {
  config: SupervisorConfig,
  state: State,
  restarts: u32,
}

impl DevSupervisor {
  pub fn new(config: SupervisorConfig) -> Self {
    Self { config, state: State::Idle, restarts: 0 }
  }

  pub fn is_running(&self) -> bool {
    matches!(self.state, State::Running(_))
  }

  pub fn pid(&self) -> Option<u32> {
    match &self.state {
      State::Running(proc) => proc.child.id(),
      State::Idle => None,
    }
  }

  /// Successful spawns so far, the first one included.
  pub fn restarts(&self) -> u32 {
    self.restarts
  }

  /// Stop the current child (if any) and spawn a fresh one against the
  /// artifact on disk. Returns the previous child's exit status. On spawn
  /// failure the supervisor stays Idle.
  pub async fn restart(&mut self) -> Result<Option<ExitStatus>> {
    let previous = self.stop().await?;
    let artifact = self.config.artifact.to_string_lossy();
    let env = self.config.env.iter().map(|(k, v)| (k.as_str(), v.as_str()));
    let mut proc =
      spawn_binary("server", &self.config.runtime, &[&*artifact], &self.config.working_dir, env)?;
    pipe_output(&mut proc);
    self.state = State::Running(proc);
    self.restarts += 1;
    Ok(previous)
  }

  /// Terminate the live child, if any. Safe to call repeatedly.
  pub async fn shutdown(&mut self) -> Result<Option<ExitStatus>> {
    self.stop().await
  }

  async fn stop(&mut self) -> Result<Option<ExitStatus>> {
    let State::Running(mut proc) = std::mem::replace(&mut self.state, State::Idle) else {
      return Ok(None);
    };
    if let Some(status) = proc.child.try_wait()? {
      return Ok(Some(status));
    }
    send_terminate(&mut proc.child)?;
    if let Ok(status) = tokio::time::timeout(self.config.grace, proc.child.wait()).await {
      return Ok(Some(status?));
    }
    proc.child.kill().await.context("failed to kill server process")?;
    Ok(Some(proc.child.wait().await?))
  }
}

#[cfg(unix)]
fn send_terminate(child: &mut Child) -> Result<()> {
  use nix::errno::Errno;
  use nix::sys::signal::{Signal, kill};
  use nix::unistd::Pid;

  // Already reaped
  let Some(pid) = child.id() else {
    return Ok(());
  };
  let pid = i32::try_from(pid).context("server pid out of range")?;
  match kill(Pid::from_raw(pid), Signal::SIGTERM) {
    Ok(()) | Err(Errno::ESRCH) => Ok(()),
    Err(e) => Err(e).context("failed to signal server process"),
  }
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child) -> Result<()> {
  child.start_kill().context("failed to stop server process")
}
