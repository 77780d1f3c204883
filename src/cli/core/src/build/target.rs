/* src/cli/core/src/build/target.rs */

use std::future::Future;

use anyhow::{Context, Result};

use super::bundler::{BundlePlan, Bundler};
use super::manifest::BuildManifest;

/// One of the two artifacts. `plan` describes the compile, `on_build_complete`
/// runs after every successful compile and must finish before the pass counts
/// as done.
pub trait BuildTarget: Send + Sync {
  fn label(&self) -> &'static str;

  fn plan(&self) -> Result<BundlePlan>;

  fn on_build_complete(&self, manifest: &BuildManifest) -> impl Future<Output = Result<()>> + Send;
}

/// Compile, then finalize. Errors name the target and the failing phase.
pub async fn run_pass<T, B>(target: &T, bundler: &B) -> Result<BuildManifest>
where
  T: BuildTarget,
  B: Bundler,
{
  let label = target.label();
  let plan = target.plan().with_context(|| format!("{label}: invalid bundle plan"))?;
  let manifest = bundler.bundle(&plan).await.with_context(|| format!("{label}: compile failed"))?;
  target
    .on_build_complete(&manifest)
    .await
    .with_context(|| format!("{label}: post-build step failed"))?;
  Ok(manifest)
}
