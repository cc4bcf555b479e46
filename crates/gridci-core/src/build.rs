//! Build descriptors.

use crate::naming::BuildKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything downstream stages need to run one matrix cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildParameters {
    pub language: String,
    pub version: String,
    pub before_install: Vec<String>,
    pub install: Vec<String>,
    pub before_script: Vec<String>,
    pub script: Vec<String>,
    /// Resolved environment variables for this cell. A `BTreeMap` keeps
    /// the mapping order-independent and its renderings deterministic.
    pub env: BTreeMap<String, String>,
    /// Absolute path of the source tree the build was discovered from.
    pub origin: PathBuf,
    /// Host timezone, injected by the caller at discovery time.
    pub timezone: String,
}

/// Immutable descriptor of one concrete, fully parameterized build job
/// derived from one matrix combination.
///
/// Constructed by a strategy's discovery step, consumed read-only by
/// preparation and later stages, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    project_name: String,
    strategy_name: String,
    key: BuildKey,
    parameters: BuildParameters,
    description: String,
}

impl Build {
    pub fn new(
        project_name: impl Into<String>,
        strategy_name: impl Into<String>,
        key: BuildKey,
        parameters: BuildParameters,
        description: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            strategy_name: strategy_name.into(),
            key,
            parameters,
            description: description.into(),
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn strategy_name(&self) -> &str {
        &self.strategy_name
    }

    pub fn key(&self) -> &BuildKey {
        &self.key
    }

    pub fn parameters(&self) -> &BuildParameters {
        &self.parameters
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::{self, BuildIdentity};

    #[test]
    fn test_build_exposes_its_parts() {
        let env = BTreeMap::new();
        let key = naming::unique_key(&BuildIdentity {
            language: "php",
            version: "8.3",
            env: &env,
        });
        let parameters = BuildParameters {
            language: "php".to_string(),
            version: "8.3".to_string(),
            before_install: vec![],
            install: vec!["composer install".to_string()],
            before_script: vec![],
            script: vec!["phpunit".to_string()],
            env,
            origin: PathBuf::from("/srv/app"),
            timezone: "UTC".to_string(),
        };

        let build = Build::new("app", "travis", key.clone(), parameters, "php = 8.3");
        assert_eq!(build.project_name(), "app");
        assert_eq!(build.strategy_name(), "travis");
        assert_eq!(build.key(), &key);
        assert_eq!(build.parameters().install, vec!["composer install"]);
        assert_eq!(build.description(), "php = 8.3");
    }
}
