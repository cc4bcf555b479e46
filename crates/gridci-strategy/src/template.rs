//! Dockerfile templates and rendering.
//!
//! Templates are embedded per language/version and rendered with
//! `${var}` interpolation over a build's parameters:
//! - `${language}`, `${version}`, `${timezone}`, `${origin}`, `${key}`
//! - `${before_install}` / `${install}` / `${before_script}` /
//!   `${script}` — the phase's commands joined with ` && `, or `true`
//!   when the phase is empty so `RUN ${install}` stays well-formed
//! - `${env.NAME}` — one resolved environment variable
//! - `${env_instructions}` — newline-joined `ENV NAME="value"` lines
//!
//! Unknown variables are left verbatim in the output.

use gridci_core::{Build, Error, Result};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

static VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)?)\}").unwrap()
});

/// Embedded Dockerfile templates, addressed by
/// `<language>/Dockerfile-<version>`.
pub struct TemplateStore {
    templates: HashMap<&'static str, &'static str>,
}

impl TemplateStore {
    /// The templates shipped with the strategy.
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            "php/Dockerfile-8.1",
            include_str!("../templates/php/Dockerfile-8.1"),
        );
        templates.insert(
            "php/Dockerfile-8.2",
            include_str!("../templates/php/Dockerfile-8.2"),
        );
        templates.insert(
            "php/Dockerfile-8.3",
            include_str!("../templates/php/Dockerfile-8.3"),
        );
        templates.insert(
            "node_js/Dockerfile-18",
            include_str!("../templates/node_js/Dockerfile-18"),
        );
        templates.insert(
            "node_js/Dockerfile-20",
            include_str!("../templates/node_js/Dockerfile-20"),
        );
        templates.insert(
            "node_js/Dockerfile-22",
            include_str!("../templates/node_js/Dockerfile-22"),
        );
        templates.insert(
            "ruby/Dockerfile-3.2",
            include_str!("../templates/ruby/Dockerfile-3.2"),
        );
        templates.insert(
            "ruby/Dockerfile-3.3",
            include_str!("../templates/ruby/Dockerfile-3.3"),
        );
        templates.insert(
            "python/Dockerfile-3.11",
            include_str!("../templates/python/Dockerfile-3.11"),
        );
        templates.insert(
            "python/Dockerfile-3.12",
            include_str!("../templates/python/Dockerfile-3.12"),
        );
        Self { templates }
    }

    /// Template text for a language/version pair.
    pub fn get(&self, language: &str, version: &str) -> Result<&'static str> {
        let key = format!("{language}/Dockerfile-{version}");
        self.templates
            .get(key.as_str())
            .copied()
            .ok_or(Error::TemplateNotFound(key))
    }

    /// Render the manifest for a build, binding all of its parameters
    /// as template variables.
    pub fn render(&self, build: &Build) -> Result<String> {
        let parameters = build.parameters();
        let template = self.get(&parameters.language, &parameters.version)?;
        Ok(interpolate(template, build))
    }
}

fn interpolate(template: &str, build: &Build) -> String {
    VAR_REGEX
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            resolve(build, name).unwrap_or_else(|| format!("${{{name}}}"))
        })
        .to_string()
}

fn resolve(build: &Build, name: &str) -> Option<String> {
    let parameters = build.parameters();
    match name.split_once('.') {
        Some(("env", var)) => parameters.env.get(var).cloned(),
        Some(_) => None,
        None => match name {
            "language" => Some(parameters.language.clone()),
            "version" => Some(parameters.version.clone()),
            "timezone" => Some(parameters.timezone.clone()),
            "origin" => Some(parameters.origin.display().to_string()),
            "key" => Some(build.key().to_string()),
            "before_install" => Some(join_phase(&parameters.before_install)),
            "install" => Some(join_phase(&parameters.install)),
            "before_script" => Some(join_phase(&parameters.before_script)),
            "script" => Some(join_phase(&parameters.script)),
            "env_instructions" => Some(env_instructions(&parameters.env)),
            _ => None,
        },
    }
}

fn join_phase(commands: &[String]) -> String {
    if commands.is_empty() {
        "true".to_string()
    } else {
        commands.join(" && ")
    }
}

fn env_instructions(env: &BTreeMap<String, String>) -> String {
    env.iter()
        .map(|(name, value)| format!("ENV {name}=\"{value}\""))
        .collect::<Vec<_>>()
        .join("\n")
}
