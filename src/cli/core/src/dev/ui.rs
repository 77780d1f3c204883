/* src/cli/core/src/dev/ui.rs */

use std::path::PathBuf;

use crate::build::config::{BuildConfig, BundlerMode};
use crate::ui::{BOLD, CYAN, DIM, GREEN, MAGENTA, RESET};

pub(super) fn print_dev_banner(config: &BuildConfig, watched: &[PathBuf]) {
  crate::ui::banner("dev", &config.project_name);

  let bundler = match &config.bundler_mode {
    BundlerMode::BuiltIn => "esbuild",
    BundlerMode::Custom { command } => command.as_str(),
  };
  println!("  {MAGENTA}client{RESET}    {DIM}{} [{bundler}]{RESET}", config.client_entry);
  println!(
    "  {CYAN}server{RESET}    {DIM}{} {}{RESET}",
    config.runtime,
    config.server_artifact().display()
  );
  if !watched.is_empty() {
    let dirs: Vec<String> = watched
      .iter()
      .map(|dir| {
        let rel = dir.strip_prefix(&config.root).unwrap_or(dir);
        format!("{}/", rel.display())
      })
      .collect();
    println!("  {GREEN}watching{RESET}  {DIM}{}{RESET}", dirs.join(", "));
  }
  println!();
  println!("  {GREEN}\u{2192}{RESET} {BOLD}http://localhost:{}{RESET}", config.port);
  println!();
}
