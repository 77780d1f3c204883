/* src/cli/core/src/dev/watch.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::build::config::BuildConfig;

/// Which bundler a file change concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
  Client,
  Server,
  /// Shared code under `src/` outside the client and server trees
  Both,
}

#[derive(Debug, Clone)]
pub struct WatchRoots {
  src: PathBuf,
  client_src: PathBuf,
  server_src: PathBuf,
  public: PathBuf,
  worlds: PathBuf,
}

impl WatchRoots {
  pub fn from_build(config: &BuildConfig) -> Self {
    let src = config.root.join("src");
    Self {
      client_src: src.join("client"),
      server_src: src.join("server"),
      src,
      public: config.public_dir.clone(),
      worlds: config.worlds_dir.clone(),
    }
  }

  /// Directories to register, skipping ones already covered by `src/`.
  fn watch_dirs(&self) -> Vec<&Path> {
    let mut dirs = vec![self.src.as_path()];
    for extra in [&self.worlds, &self.public] {
      if !extra.starts_with(&self.src) {
        dirs.push(extra.as_path());
      }
    }
    dirs
  }
}

pub fn classify_change(path: &Path, roots: &WatchRoots) -> Option<ChangeScope> {
  if path.starts_with(&roots.public) || path.starts_with(&roots.client_src) {
    Some(ChangeScope::Client)
  } else if path.starts_with(&roots.server_src) || path.starts_with(&roots.worlds) {
    Some(ChangeScope::Server)
  } else if path.starts_with(&roots.src) {
    Some(ChangeScope::Both)
  } else {
    None
  }
}

fn notify_scope(scope: ChangeScope, client_tx: &Sender<()>, server_tx: &Sender<()>) {
  // A full channel already means a rebuild is pending
  if matches!(scope, ChangeScope::Client | ChangeScope::Both) {
    let _ = client_tx.try_send(());
  }
  if matches!(scope, ChangeScope::Server | ChangeScope::Both) {
    let _ = server_tx.try_send(());
  }
}

pub struct ChangeFeed {
  /// Dropping the watcher closes both channels
  pub watcher: RecommendedWatcher,
  pub client: Receiver<()>,
  pub server: Receiver<()>,
  pub watched: Vec<PathBuf>,
}

pub fn start_watcher(roots: WatchRoots) -> Result<ChangeFeed> {
  let (client_tx, client) = mpsc::channel(16);
  let (server_tx, server) = mpsc::channel(16);
  let dirs: Vec<PathBuf> = roots.watch_dirs().into_iter().map(Path::to_path_buf).collect();

  let mut watcher = RecommendedWatcher::new(
    move |res: std::result::Result<notify::Event, notify::Error>| {
      let Ok(event) = res else {
        return;
      };
      if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
        return;
      }
      for path in &event.paths {
        if let Some(scope) = classify_change(path, &roots) {
          notify_scope(scope, &client_tx, &server_tx);
        }
      }
    },
    notify::Config::default(),
  )?;

  let mut watched = Vec::new();
  for dir in dirs {
    if dir.is_dir() {
      watcher
        .watch(&dir, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", dir.display()))?;
      watched.push(dir);
    }
  }
  Ok(ChangeFeed { watcher, client, server, watched })
}
