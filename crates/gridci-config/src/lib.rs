//! Travis-dialect configuration decoding for GridCI.
//!
//! This crate handles:
//! - `.travis.yml` deserialization (scalar-or-list coercion)
//! - Environment line parsing
//! - Per-language default commands and version-field aliases

pub mod defaults;
pub mod env;
pub mod travis;

pub use defaults::{DEFAULT_LANGUAGE, LanguageDefaults, LanguageProfile};
pub use env::parse_env_line;
pub use travis::{OneOrMany, TravisConfig};
