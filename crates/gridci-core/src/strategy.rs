//! Strategy trait and registry.
//!
//! A strategy is a pluggable CI-dialect reader: it probes a project
//! directory for its configuration file, expands the configuration
//! matrix into builds, and prepares on-disk contexts for them. The
//! registry probes its strategies in registration order, which is the
//! contract other dialects implement to be interchangeable.

use crate::{Build, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[async_trait]
pub trait BuildStrategy: Send + Sync {
    /// Fixed strategy identifier, used as a namespace component in
    /// generated keys and target directory names.
    fn name(&self) -> &'static str;

    /// Whether the project carries this strategy's configuration file.
    /// Existence check only; no content validation, no side effects.
    async fn supports_project(&self, project_dir: &Path) -> bool;

    /// Read the project's CI configuration and expand its matrix into
    /// one [`Build`] per combination.
    async fn builds(&self, project_dir: &Path) -> Result<Vec<Build>>;

    /// Materialize a previously discovered build: mirror its origin
    /// into the target directory and render the build manifest there.
    /// Returns the prepared directory.
    ///
    /// Destructive and idempotent at the filesystem level, but not
    /// transactional: a failed call leaves partial state behind, and
    /// concurrent calls for the same project must be serialized by the
    /// caller.
    async fn prepare_build(&self, build: &Build) -> Result<PathBuf>;
}

/// Ordered collection of strategies, probed first-registered-first.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn BuildStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, strategy: Arc<dyn BuildStrategy>) {
        self.strategies.push(strategy);
    }

    /// First registered strategy whose configuration file exists in the
    /// project directory.
    pub async fn find_for(&self, project_dir: &Path) -> Option<Arc<dyn BuildStrategy>> {
        for strategy in &self.strategies {
            if strategy.supports_project(project_dir).await {
                return Some(Arc::clone(strategy));
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubStrategy {
        name: &'static str,
        supports: bool,
    }

    #[async_trait]
    impl BuildStrategy for StubStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn supports_project(&self, _project_dir: &Path) -> bool {
            self.supports
        }

        async fn builds(&self, _project_dir: &Path) -> Result<Vec<Build>> {
            Ok(vec![])
        }

        async fn prepare_build(&self, _build: &Build) -> Result<PathBuf> {
            Ok(PathBuf::new())
        }
    }

    #[tokio::test]
    async fn test_registry_probes_in_order() {
        let mut registry = StrategyRegistry::new();
        registry.register(Arc::new(StubStrategy {
            name: "first",
            supports: false,
        }));
        registry.register(Arc::new(StubStrategy {
            name: "second",
            supports: true,
        }));
        registry.register(Arc::new(StubStrategy {
            name: "third",
            supports: true,
        }));

        let found = registry.find_for(Path::new("/tmp")).await.unwrap();
        assert_eq!(found.name(), "second");
    }

    #[tokio::test]
    async fn test_registry_returns_none_when_unsupported() {
        let mut registry = StrategyRegistry::new();
        registry.register(Arc::new(StubStrategy {
            name: "only",
            supports: false,
        }));

        assert!(registry.find_for(Path::new("/tmp")).await.is_none());
    }
}
