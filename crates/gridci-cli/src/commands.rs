//! CLI command implementations.

use anyhow::{Context, Result, bail};
use gridci_core::{BuildStrategy, StrategyRegistry};
use gridci_strategy::TravisStrategy;
use std::path::Path;
use std::sync::Arc;

/// Registry of the strategies this binary knows about, probed in order.
fn registry(build_root: &str) -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    registry.register(Arc::new(TravisStrategy::new(build_root, host_timezone())));
    registry
}

/// Host timezone, detected here and injected into the strategies so the
/// library never reads ambient state.
fn host_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if !tz.is_empty() {
            return tz;
        }
    }
    std::fs::read_to_string("/etc/timezone")
        .map(|contents| contents.trim().to_string())
        .ok()
        .filter(|tz| !tz.is_empty())
        .unwrap_or_else(|| "UTC".to_string())
}

async fn strategy_for(build_root: &str, path: &str) -> Result<Arc<dyn BuildStrategy>> {
    registry(build_root)
        .find_for(Path::new(path))
        .await
        .with_context(|| format!("no supported CI configuration found in {path}"))
}

/// List the builds a project expands to.
pub async fn builds(build_root: &str, path: &str) -> Result<()> {
    let strategy = strategy_for(build_root, path).await?;
    let builds = strategy.builds(Path::new(path)).await?;

    println!("{} build(s) for {} ({})", builds.len(), path, strategy.name());
    for build in &builds {
        println!("  {}  {}", build.key().short(), build.description());
    }
    Ok(())
}

/// Prepare build contexts, optionally restricted to one key prefix.
pub async fn prepare(build_root: &str, path: &str, key_prefix: Option<String>) -> Result<()> {
    let strategy = strategy_for(build_root, path).await?;
    let mut builds = strategy.builds(Path::new(path)).await?;

    if let Some(prefix) = &key_prefix {
        builds.retain(|build| build.key().as_str().starts_with(prefix.as_str()));
        if builds.is_empty() {
            bail!("no build matches key prefix '{prefix}'");
        }
    }

    // Builds of one project share a target directory, so prepare them
    // one at a time.
    for build in &builds {
        let target = strategy.prepare_build(build).await?;
        println!(
            "✓ {}  {} -> {}",
            build.key().short(),
            build.description(),
            target.display()
        );
    }
    Ok(())
}

/// Decode the configuration and report the matrix size.
pub async fn validate(build_root: &str, path: &str) -> Result<()> {
    let strategy = strategy_for(build_root, path).await?;
    let builds = strategy.builds(Path::new(path)).await?;

    println!(
        "✓ {} parses; matrix expands to {} build(s)",
        gridci_strategy::CONFIG_FILE,
        builds.len()
    );
    Ok(())
}
