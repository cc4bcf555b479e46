//! Core domain types and traits for GridCI.
//!
//! This crate contains:
//! - The combinatorial build matrix
//! - Build descriptors and their identity keys
//! - Naming helpers (project names, unique keys, target directories)
//! - The `BuildStrategy` trait and strategy registry
//! - Shared error types

pub mod build;
pub mod error;
pub mod matrix;
pub mod naming;
pub mod strategy;

pub use build::{Build, BuildParameters};
pub use error::{Error, Result};
pub use matrix::{Combination, Matrix};
pub use naming::BuildKey;
pub use strategy::{BuildStrategy, StrategyRegistry};
