//! Error types for GridCI.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no CI configuration found at {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("failed to parse CI configuration: {0}")]
    ConfigParse(String),

    #[error("no runtime versions declared for language '{0}'")]
    MissingVersions(String),

    #[error("malformed environment entry '{0}': expected KEY=VALUE")]
    EnvFormat(String),

    #[error("no build template for '{0}'")]
    TemplateNotFound(String),

    #[error("filesystem operation failed: {0}")]
    Filesystem(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
