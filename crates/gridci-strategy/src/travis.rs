//! Travis build strategy.
//!
//! Reads a project's `.travis.yml`, expands the configuration matrix
//! (language × runtime version × environment set) into one [`Build`]
//! per cell, and prepares ready-to-build Docker contexts for them.

use crate::mirror::mirror;
use crate::template::TemplateStore;
use async_trait::async_trait;
use gridci_config::{LanguageDefaults, OneOrMany, TravisConfig, parse_env_line};
use gridci_core::naming::{self, BuildIdentity};
use gridci_core::{
    Build, BuildParameters, BuildStrategy, Combination, Error, Matrix, Result,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the configuration file probed for.
pub const CONFIG_FILE: &str = ".travis.yml";

/// Name of the manifest written into each prepared context.
pub const MANIFEST_FILE: &str = "Dockerfile";

/// Strategy for projects configured through the Travis dialect.
pub struct TravisStrategy {
    build_root: PathBuf,
    timezone: String,
    defaults: LanguageDefaults,
    templates: TemplateStore,
}

impl TravisStrategy {
    /// Create a strategy writing prepared contexts under `build_root`.
    ///
    /// The host timezone is injected rather than read ambiently so
    /// discovery stays pure and testable.
    pub fn new(build_root: impl Into<PathBuf>, timezone: impl Into<String>) -> Self {
        Self {
            build_root: build_root.into(),
            timezone: timezone.into(),
            defaults: LanguageDefaults::builtin(),
            templates: TemplateStore::builtin(),
        }
    }

    /// Replace the per-language defaults table.
    pub fn with_defaults(mut self, defaults: LanguageDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    fn combination_to_build(
        &self,
        combination: &Combination,
        project: &str,
        origin: &Path,
    ) -> Build {
        let parameters = BuildParameters {
            language: string_dimension(combination, "language"),
            version: string_dimension(combination, "version"),
            before_install: list_dimension(combination, "before_install"),
            install: list_dimension(combination, "install"),
            before_script: list_dimension(combination, "before_script"),
            script: list_dimension(combination, "script"),
            env: map_dimension(combination, "env"),
            origin: origin.to_path_buf(),
            timezone: self.timezone.clone(),
        };
        let key = naming::unique_key(&BuildIdentity {
            language: &parameters.language,
            version: &parameters.version,
            env: &parameters.env,
        });
        let description = describe(&parameters);
        Build::new(project, self.name(), key, parameters, description)
    }
}

#[async_trait]
impl BuildStrategy for TravisStrategy {
    fn name(&self) -> &'static str {
        "travis"
    }

    async fn supports_project(&self, project_dir: &Path) -> bool {
        match fs::metadata(project_dir.join(CONFIG_FILE)).await {
            Ok(metadata) => metadata.is_file(),
            Err(_) => false,
        }
    }

    async fn builds(&self, project_dir: &Path) -> Result<Vec<Build>> {
        let config_path = project_dir.join(CONFIG_FILE);
        let raw = match fs::read_to_string(&config_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound(config_path));
            }
            Err(e) => return Err(Error::Filesystem(e)),
        };
        let config = TravisConfig::parse(&raw)?;

        let language = config.language().to_string();
        let profile = self.defaults.profile(&language);

        let versions = config.versions(&profile.version_key);
        if versions.is_empty() {
            return Err(Error::MissingVersions(language));
        }

        let mut env_sets: Vec<BTreeMap<String, String>> = Vec::new();
        if let Some(field) = config.env.clone() {
            for line in field.into_vec() {
                env_sets.push(parse_env_line(&line)?);
            }
        }
        if env_sets.is_empty() {
            env_sets.push(BTreeMap::new());
        }

        let before_install = resolve_phase(&config.before_install, &profile.before_install);
        let install = resolve_phase(&config.install, &profile.install);
        let before_script = resolve_phase(&config.before_script, &profile.before_script);
        let script = resolve_phase(&config.script, &profile.script);

        let mut matrix = Matrix::new();
        matrix.set_dimension("language", vec![Value::String(language)]);
        matrix.set_dimension("version", versions.into_iter().map(Value::String).collect());
        matrix.set_dimension("env", env_sets.iter().map(|set| json!(set)).collect());
        matrix.set_dimension("before_install", vec![json!(before_install)]);
        matrix.set_dimension("install", vec![json!(install)]);
        matrix.set_dimension("before_script", vec![json!(before_script)]);
        matrix.set_dimension("script", vec![json!(script)]);

        let origin = fs::canonicalize(project_dir).await?;
        let project = naming::project_name(&origin);

        let builds: Vec<Build> = matrix
            .compute()
            .map(|combination| self.combination_to_build(&combination, &project, &origin))
            .collect();

        info!(
            project = %project,
            count = builds.len(),
            "expanded build matrix"
        );
        Ok(builds)
    }

    async fn prepare_build(&self, build: &Build) -> Result<PathBuf> {
        let target = naming::build_dir(
            &self.build_root,
            build.project_name(),
            build.strategy_name(),
        );
        debug!(
            key = %build.key().short(),
            target = %target.display(),
            "preparing build context"
        );

        mirror(&build.parameters().origin, &target)?;

        let manifest = self.templates.render(build)?;
        fs::write(target.join(MANIFEST_FILE), manifest).await?;

        info!(
            key = %build.key().short(),
            target = %target.display(),
            "build context prepared"
        );
        Ok(target)
    }
}

/// Explicit configuration value, or the language default when the field
/// is absent or empty.
fn resolve_phase(explicit: &Option<OneOrMany>, default: &[String]) -> Vec<String> {
    match explicit.clone().map(OneOrMany::into_vec) {
        Some(commands) if !commands.is_empty() => commands,
        _ => default.to_vec(),
    }
}

fn describe(parameters: &BuildParameters) -> String {
    let mut description = format!("{} = {}", parameters.language, parameters.version);
    if !parameters.env.is_empty() {
        let rendered: Vec<String> = parameters
            .env
            .iter()
            .map(|(name, value)| format!("\"{name}\": \"{value}\""))
            .collect();
        description.push_str(&format!(", Environment: {{{}}}", rendered.join(", ")));
    }
    description
}

fn string_dimension(combination: &Combination, name: &str) -> String {
    combination
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn list_dimension(combination: &Combination, name: &str) -> Vec<String> {
    combination
        .get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn map_dimension(combination: &Combination, name: &str) -> BTreeMap<String, String> {
    combination
        .get(name)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn project_with(config: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), config).unwrap();
        dir
    }

    fn strategy(build_root: &Path) -> TravisStrategy {
        TravisStrategy::new(build_root, "UTC")
    }

    #[tokio::test]
    async fn test_supports_project_checks_for_config_file() {
        let with_config = project_with("language: php\n");
        let without_config = tempfile::tempdir().unwrap();
        let strategy = strategy(Path::new("/tmp/gridci"));

        assert!(strategy.supports_project(with_config.path()).await);
        assert!(!strategy.supports_project(without_config.path()).await);
    }

    #[tokio::test]
    async fn test_builds_expand_version_times_env() {
        let dir = project_with(
            r#"
            language: php
            php:
              - "8.2"
              - "8.3"
            env:
              - DB=sqlite
              - DB=mysql
              - DB=pgsql
        "#,
        );
        let strategy = strategy(Path::new("/tmp/gridci"));

        let builds = strategy.builds(dir.path()).await.unwrap();
        assert_eq!(builds.len(), 6);

        let keys: HashSet<_> = builds.iter().map(|b| b.key().as_str().to_string()).collect();
        assert_eq!(keys.len(), 6);
    }

    #[tokio::test]
    async fn test_description_includes_environment() {
        let dir = project_with(
            r#"
            language: php
            php: ["8.3"]
            env: DB=sqlite
        "#,
        );
        let strategy = strategy(Path::new("/tmp/gridci"));

        let builds = strategy.builds(dir.path()).await.unwrap();
        assert_eq!(
            builds[0].description(),
            "php = 8.3, Environment: {\"DB\": \"sqlite\"}"
        );
    }

    #[tokio::test]
    async fn test_description_without_environment() {
        let dir = project_with("language: php\nphp: [\"8.3\"]\n");
        let strategy = strategy(Path::new("/tmp/gridci"));

        let builds = strategy.builds(dir.path()).await.unwrap();
        assert_eq!(builds[0].description(), "php = 8.3");
    }

    #[tokio::test]
    async fn test_scalar_script_becomes_single_command() {
        let dir = project_with(
            r#"
            language: node_js
            node_js: ["20"]
            script: grunt test
        "#,
        );
        let strategy = strategy(Path::new("/tmp/gridci"));

        let builds = strategy.builds(dir.path()).await.unwrap();
        assert_eq!(builds[0].parameters().script, vec!["grunt test"]);
    }

    #[tokio::test]
    async fn test_omitted_install_uses_language_default() {
        let dir = project_with("language: php\nphp: [\"8.3\"]\n");
        let strategy = strategy(Path::new("/tmp/gridci"));

        let builds = strategy.builds(dir.path()).await.unwrap();
        assert_eq!(builds[0].parameters().install, vec!["composer install"]);
        assert_eq!(builds[0].parameters().script, vec!["phpunit"]);
    }

    #[tokio::test]
    async fn test_ruby_versions_come_from_rvm() {
        let dir = project_with("rvm: [\"3.2\", \"3.3\"]\n");
        let strategy = strategy(Path::new("/tmp/gridci"));

        let builds = strategy.builds(dir.path()).await.unwrap();
        assert_eq!(builds.len(), 2);
        assert_eq!(builds[0].parameters().language, "ruby");
        assert_eq!(builds[0].parameters().install, vec!["bundle install"]);
    }

    #[tokio::test]
    async fn test_missing_versions_is_hard_error() {
        let dir = project_with("language: php\n");
        let strategy = strategy(Path::new("/tmp/gridci"));

        let err = strategy.builds(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::MissingVersions(language) if language == "php"));
    }

    #[tokio::test]
    async fn test_missing_config_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = strategy(Path::new("/tmp/gridci"));

        let err = strategy.builds(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_env_line_is_error() {
        let dir = project_with(
            r#"
            language: php
            php: ["8.3"]
            env: NOT_A_PAIR
        "#,
        );
        let strategy = strategy(Path::new("/tmp/gridci"));

        let err = strategy.builds(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::EnvFormat(_)));
    }

    #[tokio::test]
    async fn test_equal_env_mappings_share_keys_across_runs() {
        let forward = project_with("language: php\nphp: [\"8.3\"]\nenv: A=B C=D\n");
        let reversed = project_with("language: php\nphp: [\"8.3\"]\nenv: C=D A=B\n");
        let strategy = strategy(Path::new("/tmp/gridci"));

        let first = strategy.builds(forward.path()).await.unwrap();
        let second = strategy.builds(reversed.path()).await.unwrap();
        assert_eq!(first[0].key(), second[0].key());
    }

    #[tokio::test]
    async fn test_builds_are_deterministic() {
        let dir = project_with(
            r#"
            language: php
            php: ["8.2", "8.3"]
            env:
              - DB=sqlite
              - DB=mysql
        "#,
        );
        let strategy = strategy(Path::new("/tmp/gridci"));

        let first: Vec<_> = strategy
            .builds(dir.path())
            .await
            .unwrap()
            .iter()
            .map(|b| (b.key().as_str().to_string(), b.description().to_string()))
            .collect();
        let second: Vec<_> = strategy
            .builds(dir.path())
            .await
            .unwrap()
            .iter()
            .map(|b| (b.key().as_str().to_string(), b.description().to_string()))
            .collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_prepare_build_mirrors_and_writes_manifest() {
        let dir = project_with("language: php\nphp: [\"8.3\"]\nenv: DB=sqlite\n");
        std::fs::write(dir.path().join("index.php"), "<?php echo 'hi';\n").unwrap();
        let build_root = tempfile::tempdir().unwrap();
        let strategy = strategy(build_root.path());

        let builds = strategy.builds(dir.path()).await.unwrap();
        let target = strategy.prepare_build(&builds[0]).await.unwrap();

        assert!(target.ends_with(
            Path::new(builds[0].project_name()).join("travis")
        ));
        assert!(target.join("index.php").exists());
        assert!(target.join(CONFIG_FILE).exists());

        let manifest = std::fs::read_to_string(target.join(MANIFEST_FILE)).unwrap();
        assert!(manifest.contains("FROM php:8.3-cli"));
        assert!(manifest.contains("ENV DB=\"sqlite\""));
        assert!(manifest.contains("RUN composer install"));
    }

    #[tokio::test]
    async fn test_prepare_build_removes_stale_files() {
        let dir = project_with("language: php\nphp: [\"8.3\"]\n");
        let build_root = tempfile::tempdir().unwrap();
        let strategy = strategy(build_root.path());

        let builds = strategy.builds(dir.path()).await.unwrap();
        let target = strategy.prepare_build(&builds[0]).await.unwrap();

        std::fs::write(target.join("stale.txt"), "leftover").unwrap();
        let target = strategy.prepare_build(&builds[0]).await.unwrap();

        assert!(!target.join("stale.txt").exists());
        assert!(target.join(MANIFEST_FILE).exists());
    }

    #[tokio::test]
    async fn test_prepare_build_without_template_fails() {
        let dir = project_with("language: php\nphp: [\"5.3\"]\n");
        let build_root = tempfile::tempdir().unwrap();
        let strategy = strategy(build_root.path());

        let builds = strategy.builds(dir.path()).await.unwrap();
        let err = strategy.prepare_build(&builds[0]).await.unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));
    }
}
