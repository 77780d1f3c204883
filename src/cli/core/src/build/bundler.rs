/* src/cli/core/src/build/bundler.rs */

// One compile pass of the underlying bundler. The plan is plain data so the
// built-in runner (or a custom command) can execute it out of process.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use tokio::sync::OnceCell;

use super::config::{BuildConfig, BundlerMode};
use super::manifest::BuildManifest;
use crate::shell::{run_command, run_program, which_exists};
use crate::ui::{self, DIM, RESET};

const RUNNER_SCRIPT: &str = include_str!("../../scripts/bundle.mjs");
const RUNNER_FILE: &str = "bundle.mjs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  Browser,
  Node,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResolveAction {
  /// Leave the import to the runtime.
  External,
  /// Drop `strip_prefix` from the import path and join the rest onto `base`.
  #[serde(rename_all = "camelCase")]
  Redirect { strip_prefix: String, base: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  External,
  Path(PathBuf),
}

/// An `onResolve` hook expressed as data: imports matching `filter` get `action`.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveRule {
  pub filter: String,
  pub action: ResolveAction,
  #[serde(skip)]
  pattern: Regex,
}

impl ResolveRule {
  pub fn new(filter: &str, action: ResolveAction) -> Result<Self> {
    let pattern =
      Regex::new(filter).with_context(|| format!("invalid resolve filter \"{filter}\""))?;
    Ok(Self { filter: filter.to_string(), action, pattern })
  }

  /// Exact-match external package, e.g. `three` but not `three/addons`.
  pub fn external(package: &str) -> Result<Self> {
    Self::new(&format!("^{}$", regex::escape(package)), ResolveAction::External)
  }

  pub fn redirect(filter: &str, strip_prefix: &str, base: &Path) -> Result<Self> {
    Self::new(
      filter,
      ResolveAction::Redirect { strip_prefix: strip_prefix.to_string(), base: base.to_path_buf() },
    )
  }

  pub fn resolve(&self, import_path: &str) -> Option<Resolution> {
    if !self.pattern.is_match(import_path) {
      return None;
    }
    Some(match &self.action {
      ResolveAction::External => Resolution::External,
      ResolveAction::Redirect { strip_prefix, base } => {
        let rest = import_path.strip_prefix(strip_prefix.as_str()).unwrap_or(import_path);
        Resolution::Path(base.join(rest))
      }
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsxOptions {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub import_source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlePlan {
  pub label: String,
  pub working_dir: PathBuf,
  pub entry: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub outdir: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub outfile: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub entry_names: Option<String>,
  pub platform: Platform,
  pub format: String,
  pub sourcemap: bool,
  pub minify: bool,
  pub packages_external: bool,
  pub define: BTreeMap<String, String>,
  pub loader: BTreeMap<String, String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub jsx: Option<JsxOptions>,
  pub resolve: Vec<ResolveRule>,
  pub metafile: PathBuf,
}

impl BundlePlan {
  /// First rule that claims `import_path`, in declaration order.
  pub fn resolve(&self, import_path: &str) -> Option<Resolution> {
    self.resolve.iter().find_map(|rule| rule.resolve(import_path))
  }
}

pub trait Bundler: Send + Sync {
  fn bundle(&self, plan: &BundlePlan) -> impl Future<Output = Result<BuildManifest>> + Send;
}

/// Runs plans through esbuild, either via the embedded runner or a
/// user-supplied command that receives the plan path in `WORLDFORGE_PLAN`.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
  root: PathBuf,
  state_dir: PathBuf,
  mode: BundlerMode,
  runtime: &'static str,
  runner: OnceCell<PathBuf>,
}

impl EsbuildBundler {
  pub fn new(config: &BuildConfig) -> Self {
    let bun = config.bundler_mode == BundlerMode::BuiltIn && which_exists("bun");
    let runtime = if bun { "bun" } else { "node" };
    Self {
      root: config.root.clone(),
      state_dir: config.state_dir.clone(),
      mode: config.bundler_mode.clone(),
      runtime,
      runner: OnceCell::new(),
    }
  }

  async fn write_plan(&self, plan: &BundlePlan) -> Result<PathBuf> {
    tokio::fs::create_dir_all(&self.state_dir)
      .await
      .with_context(|| format!("failed to create {}", self.state_dir.display()))?;
    let path = self.state_dir.join(format!("{}.plan.json", plan.label));
    let json = serde_json::to_string_pretty(plan)?;
    tokio::fs::write(&path, json)
      .await
      .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
  }

  /// Written once per session and moved into place whole, so a runtime that
  /// is already loading it never sees a truncated file.
  async fn ensure_runner(&self) -> Result<&Path> {
    let runner = self
      .runner
      .get_or_try_init(|| async {
        tokio::fs::create_dir_all(&self.state_dir)
          .await
          .with_context(|| format!("failed to create {}", self.state_dir.display()))?;
        let runner = self.state_dir.join(RUNNER_FILE);
        let staging = self.state_dir.join(format!("{RUNNER_FILE}.{}.tmp", std::process::id()));
        tokio::fs::write(&staging, RUNNER_SCRIPT)
          .await
          .with_context(|| format!("failed to write {}", staging.display()))?;
        tokio::fs::rename(&staging, &runner)
          .await
          .with_context(|| format!("failed to write {}", runner.display()))?;
        Ok::<_, anyhow::Error>(runner)
      })
      .await?;
    Ok(runner)
  }

  async fn run_builtin(&self, plan_path: &Path, label: &str) -> Result<()> {
    let runner = self.ensure_runner().await?;
    let runtime = self.runtime;
    ui::detail(&format!("{DIM}{runtime} {RUNNER_FILE} {label}{RESET}"));
    let runner = runner.to_string_lossy();
    let plan_path = plan_path.to_string_lossy();
    let args = [&*runner, &*plan_path];
    run_program(&self.root, runtime, &args, &format!("{label} bundler")).await
  }
}

impl Bundler for EsbuildBundler {
  async fn bundle(&self, plan: &BundlePlan) -> Result<BuildManifest> {
    let plan_path = self.write_plan(plan).await?;
    match tokio::fs::remove_file(&plan.metafile).await {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => {
        return Err(e).with_context(|| format!("failed to remove {}", plan.metafile.display()));
      }
    }

    match &self.mode {
      BundlerMode::BuiltIn => self.run_builtin(&plan_path, &plan.label).await?,
      BundlerMode::Custom { command } => {
        let plan_env = plan_path.to_string_lossy();
        let meta_env = plan.metafile.to_string_lossy();
        let env = [("WORLDFORGE_PLAN", &*plan_env), ("WORLDFORGE_METAFILE", &*meta_env)];
        run_command(&self.root, command, &format!("{} bundler", plan.label), &env).await?;
      }
    }

    BuildManifest::from_metafile(&plan.metafile, &self.root).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn external_rule_is_exact() {
    let rule = ResolveRule::external("three").unwrap();
    assert_eq!(rule.resolve("three"), Some(Resolution::External));
    assert_eq!(rule.resolve("three/addons/loaders"), None);
    assert_eq!(rule.resolve("threejs"), None);
  }

  #[test]
  fn external_rule_escapes_scoped_names() {
    let rule = ResolveRule::external("@dimforge/rapier3d-compat").unwrap();
    assert_eq!(rule.resolve("@dimforge/rapier3d-compat"), Some(Resolution::External));
    assert_eq!(rule.resolve("@dimforge/rapier3dXcompat"), None);
  }

  #[test]
  fn redirect_rule_rewrites_worlds_imports() {
    let rule =
      ResolveRule::redirect(r"^\.\./worlds/", "../", Path::new("/srv/game")).unwrap();
    assert_eq!(
      rule.resolve("../worlds/vipe/index.js"),
      Some(Resolution::Path(PathBuf::from("/srv/game/worlds/vipe/index.js")))
    );
    assert_eq!(rule.resolve("./worlds/vipe/index.js"), None);
  }

  #[test]
  fn invalid_filter_errors() {
    assert!(ResolveRule::new("(", ResolveAction::External).is_err());
  }

  #[test]
  fn rule_serializes_without_regex() {
    let rule = ResolveRule::redirect(r"^\.\./worlds/", "../", Path::new("/srv")).unwrap();
    let json = serde_json::to_value(&rule).unwrap();
    assert_eq!(json["filter"], r"^\.\./worlds/");
    assert_eq!(json["action"]["kind"], "redirect");
    assert_eq!(json["action"]["stripPrefix"], "../");
    assert_eq!(json["action"]["base"], "/srv");
    assert!(json.get("pattern").is_none());
  }

  #[test]
  fn plan_serializes_camel_case() {
    let plan = BundlePlan {
      label: "server".into(),
      working_dir: PathBuf::from("/srv"),
      entry: "src/server/index.js".into(),
      outdir: None,
      outfile: Some(PathBuf::from("/srv/build/index.js")),
      entry_names: None,
      platform: Platform::Node,
      format: "esm".into(),
      sourcemap: true,
      minify: false,
      packages_external: true,
      define: BTreeMap::new(),
      loader: BTreeMap::new(),
      jsx: None,
      resolve: vec![ResolveRule::external("three").unwrap()],
      metafile: PathBuf::from("/srv/.worldforge/server.meta.json"),
    };
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["workingDir"], "/srv");
    assert_eq!(json["packagesExternal"], true);
    assert_eq!(json["platform"], "node");
    assert!(json.get("outdir").is_none());
    assert!(json.get("jsx").is_none());
    assert_eq!(json["resolve"][0]["action"]["kind"], "external");
    assert_eq!(plan.resolve("three"), Some(Resolution::External));
    assert_eq!(plan.resolve("ws"), None);
  }

  fn scratch_bundler() -> (tempfile::TempDir, EsbuildBundler) {
    let tmp = tempfile::tempdir().unwrap();
    let config = toml::from_str("").unwrap();
    let build = BuildConfig::resolve(&config, tmp.path(), BTreeMap::new(), false).unwrap();
    (tmp, EsbuildBundler::new(&build))
  }

  #[tokio::test]
  async fn runner_is_shared_by_concurrent_passes() {
    let (tmp, bundler) = scratch_bundler();
    let (client, server) = tokio::join!(bundler.ensure_runner(), bundler.ensure_runner());
    let (client, server) = (client.unwrap(), server.unwrap());
    assert_eq!(client, server);
    assert_eq!(client, tmp.path().join(".worldforge").join(RUNNER_FILE));
    assert_eq!(std::fs::read_to_string(client).unwrap(), RUNNER_SCRIPT);

    let leftovers: Vec<_> = std::fs::read_dir(tmp.path().join(".worldforge"))
      .unwrap()
      .map(|entry| entry.unwrap().file_name())
      .filter(|name| name.to_string_lossy().ends_with(".tmp"))
      .collect();
    assert!(leftovers.is_empty());
  }

  #[tokio::test]
  async fn runner_is_written_once_per_session() {
    let (_tmp, bundler) = scratch_bundler();
    let runner = bundler.ensure_runner().await.unwrap().to_path_buf();
    std::fs::write(&runner, "// loaded by a running pass").unwrap();

    let again = bundler.ensure_runner().await.unwrap();
    assert_eq!(again, runner);
    assert_eq!(std::fs::read_to_string(&runner).unwrap(), "// loaded by a running pass");
  }
}
