//! Configuration management for artup
//!
//! artup reads a single user-wide TOML file. See [`global`] for its location
//! and format.

pub mod global;

pub use global::{ArtifactEntry, GlobalConfig, ProgramEntry};
