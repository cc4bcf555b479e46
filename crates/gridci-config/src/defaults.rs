//! Per-language defaults and version-field aliases.
//!
//! Modeled as data rather than branches so new dialect profiles can be
//! registered without touching the matrix logic.

use std::collections::HashMap;

/// Language assumed when the configuration omits the `language` field.
pub const DEFAULT_LANGUAGE: &str = "ruby";

/// Default commands and version-field alias for one language.
#[derive(Debug, Clone, Default)]
pub struct LanguageProfile {
    /// Top-level configuration key holding the runtime version list.
    /// Most ecosystems use the language name itself; Ruby's versions
    /// conventionally live under `rvm`.
    pub version_key: String,
    pub before_install: Vec<String>,
    pub install: Vec<String>,
    pub before_script: Vec<String>,
    pub script: Vec<String>,
}

/// Registry of per-language profiles.
#[derive(Debug, Clone)]
pub struct LanguageDefaults {
    profiles: HashMap<String, LanguageProfile>,
}

impl LanguageDefaults {
    /// Profiles for the languages the built-in templates cover.
    pub fn builtin() -> Self {
        let mut defaults = Self {
            profiles: HashMap::new(),
        };
        defaults.register(
            "ruby",
            LanguageProfile {
                version_key: "rvm".to_string(),
                install: vec!["bundle install".to_string()],
                script: vec!["bundle exec rake".to_string()],
                ..Default::default()
            },
        );
        defaults.register(
            "php",
            LanguageProfile {
                version_key: "php".to_string(),
                install: vec!["composer install".to_string()],
                script: vec!["phpunit".to_string()],
                ..Default::default()
            },
        );
        defaults.register(
            "node_js",
            LanguageProfile {
                version_key: "node_js".to_string(),
                install: vec!["npm install".to_string()],
                script: vec!["npm test".to_string()],
                ..Default::default()
            },
        );
        defaults.register(
            "python",
            LanguageProfile {
                version_key: "python".to_string(),
                install: vec!["pip install -r requirements.txt".to_string()],
                script: vec!["pytest".to_string()],
                ..Default::default()
            },
        );
        defaults
    }

    /// Add or replace a language profile.
    pub fn register(&mut self, language: impl Into<String>, profile: LanguageProfile) {
        self.profiles.insert(language.into(), profile);
    }

    /// Profile for a language. Unknown languages fall back to an empty
    /// profile whose version key is the language name itself.
    pub fn profile(&self, language: &str) -> LanguageProfile {
        self.profiles.get(language).cloned().unwrap_or_else(|| LanguageProfile {
            version_key: language.to_string(),
            ..Default::default()
        })
    }
}

impl Default for LanguageDefaults {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_php_install_default() {
        let profile = LanguageDefaults::builtin().profile("php");
        assert_eq!(profile.install, vec!["composer install"]);
        assert_eq!(profile.script, vec!["phpunit"]);
        assert!(profile.before_install.is_empty());
    }

    #[test]
    fn test_ruby_version_key_alias() {
        let profile = LanguageDefaults::builtin().profile("ruby");
        assert_eq!(profile.version_key, "rvm");
    }

    #[test]
    fn test_unknown_language_falls_back_to_language_name() {
        let profile = LanguageDefaults::builtin().profile("haskell");
        assert_eq!(profile.version_key, "haskell");
        assert!(profile.install.is_empty());
        assert!(profile.script.is_empty());
    }

    #[test]
    fn test_register_replaces_profile() {
        let mut defaults = LanguageDefaults::builtin();
        defaults.register(
            "php",
            LanguageProfile {
                version_key: "php".to_string(),
                script: vec!["vendor/bin/phpunit".to_string()],
                ..Default::default()
            },
        );
        assert_eq!(defaults.profile("php").script, vec!["vendor/bin/phpunit"]);
        assert!(defaults.profile("php").install.is_empty());
    }
}
