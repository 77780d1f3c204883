/* src/cli/core/src/dev/mod.rs */

// Dev session: both targets rebuild on change, and every successful server
// pass restarts the server process through the supervisor.

mod process;
mod supervisor;
mod ui;
mod watch;

use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::signal;
use tokio::sync::mpsc::Receiver;

use crate::build::bundler::Bundler;
use crate::build::client::ClientTarget;
use crate::build::config::BuildConfig;
use crate::build::run::prepare_output;
use crate::build::server::ServerTarget;
use crate::build::target::{BuildTarget, run_pass};
use crate::ui::{DIM, GREEN, RESET};

use supervisor::{DevSupervisor, SupervisorConfig};
use watch::{WatchRoots, start_watcher};

/// Wait for a change, then let the burst settle and drop what piled up.
/// `None` once the watcher is gone.
async fn next_batch(rx: &mut Receiver<()>, debounce: Duration) -> Option<()> {
  rx.recv().await?;
  tokio::time::sleep(debounce).await;
  while rx.try_recv().is_ok() {}
  Some(())
}

/// A failed pass is reported and the previous output stays in place.
async fn logged_pass<T: BuildTarget, B: Bundler>(target: &T, bundler: &B) -> bool {
  let label = target.label();
  let started = Instant::now();
  crate::ui::tagged(label, "building...");
  match run_pass(target, bundler).await {
    Ok(_) => {
      let secs = started.elapsed().as_secs_f64();
      crate::ui::tagged(label, &format!("{GREEN}built{RESET} ({secs:.1}s)"));
      true
    }
    Err(e) => {
      crate::ui::tagged_fail(label, &format!("build failed: {e:#}"));
      false
    }
  }
}

async fn client_loop<B: Bundler>(
  target: &ClientTarget<'_>,
  bundler: &B,
  rx: &mut Receiver<()>,
  debounce: Duration,
) {
  logged_pass(target, bundler).await;
  while next_batch(rx, debounce).await.is_some() {
    logged_pass(target, bundler).await;
  }
}

async fn restart_server(supervisor: &mut DevSupervisor) {
  match supervisor.restart().await {
    Ok(_) => {
      let pid = supervisor.pid().map_or_else(String::new, |pid| format!(" {DIM}pid {pid}{RESET}"));
      crate::ui::tagged("server", &format!("started #{}{pid}", supervisor.restarts()));
    }
    // No retry: the operator sees the outage and fixes the source
    Err(e) => crate::ui::tagged_fail("server", &format!("failed to start: {e:#}")),
  }
}

async fn server_loop<B: Bundler>(
  target: &ServerTarget<'_>,
  bundler: &B,
  rx: &mut Receiver<()>,
  debounce: Duration,
  supervisor: &mut DevSupervisor,
) {
  if logged_pass(target, bundler).await {
    restart_server(supervisor).await;
  }
  while next_batch(rx, debounce).await.is_some() {
    if logged_pass(target, bundler).await {
      restart_server(supervisor).await;
    }
  }
}

pub async fn run_dev<B: Bundler>(config: &BuildConfig, bundler: &B) -> Result<()> {
  prepare_output(config).await?;
  let mut feed = start_watcher(WatchRoots::from_build(config))?;
  ui::print_dev_banner(config, &feed.watched);

  let client = ClientTarget::new(config);
  let server = ServerTarget::new(config);
  let mut supervisor = DevSupervisor::new(SupervisorConfig::from_build(config));

  {
    let client_task = client_loop(&client, bundler, &mut feed.client, config.debounce);
    let server_task =
      server_loop(&server, bundler, &mut feed.server, config.debounce, &mut supervisor);
    tokio::select! {
      _ = signal::ctrl_c() => {
        println!();
        println!("  {DIM}shutting down...{RESET}");
      }
      () = client_task => {}
      () = server_task => {}
    }
  }

  if supervisor.is_running() {
    supervisor.shutdown().await?;
  }
  drop(feed.watcher);
  Ok(())
}
