//! Travis build strategy for GridCI.
//!
//! This crate turns a project's `.travis.yml` into per-matrix-cell
//! builds and prepares ready-to-build Docker contexts for them:
//! - Configuration discovery and matrix expansion
//! - Embedded Dockerfile templates with `${var}` rendering
//! - Destructive directory mirroring into the build context

pub mod mirror;
pub mod template;
pub mod travis;

pub use template::TemplateStore;
pub use travis::{CONFIG_FILE, MANIFEST_FILE, TravisStrategy};
