//! Stable names and keys.
//!
//! Every target directory, cache entry, and re-run check downstream
//! depends on these being deterministic, so both functions are pure and
//! canonical with respect to mapping order.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Deterministic, collision-resistant identifier for one matrix cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct BuildKey(String);

impl BuildKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for compact display.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

/// The identity-bearing subset of a build's parameters.
///
/// Script phases are derived or defaulted rather than independently
/// varied, so they stay out of the key: it must remain stable across
/// refinements of the defaulting logic.
#[derive(Debug, Clone)]
pub struct BuildIdentity<'a> {
    pub language: &'a str,
    pub version: &'a str,
    pub env: &'a BTreeMap<String, String>,
}

/// Derive a filesystem-safe project name from its directory path.
///
/// The basename is lowercased and every byte outside `[a-z0-9._-]`
/// becomes a dash.
pub fn project_name(dir: &Path) -> String {
    let base = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let normalized: String = base
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let trimmed = normalized.trim_matches('-');
    if trimmed.is_empty() {
        "project".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derive the unique key for a build identity.
///
/// Fields are hashed in a fixed order with separators, and the env
/// mapping iterates in `BTreeMap` (sorted) order, so structurally equal
/// identities produce equal keys no matter how their maps were
/// assembled, and any field difference changes the key.
pub fn unique_key(identity: &BuildIdentity<'_>) -> BuildKey {
    let mut hasher = Sha256::new();
    hasher.update(identity.language.as_bytes());
    hasher.update([0]);
    hasher.update(identity.version.as_bytes());
    hasher.update([0]);
    for (name, value) in identity.env {
        hasher.update(name.as_bytes());
        hasher.update([b'=']);
        hasher.update(value.as_bytes());
        hasher.update([0]);
    }
    BuildKey(hex::encode(hasher.finalize()))
}

/// Target directory for a project's prepared build contexts.
///
/// All builds of one project/strategy pair share this directory, which
/// is why preparation must be serialized per project.
pub fn build_dir(root: &Path, project: &str, strategy: &str) -> PathBuf {
    root.join(project).join(strategy)
}
