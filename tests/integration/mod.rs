//! Integration test suite for artup
//!
//! End-to-end tests of the library API and the `artup` binary against local
//! mock HTTP servers.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **upgrade**: the update protocol through the library API
//! - **version_check**: throttled checks and channel reduction through the library API
//! - **cli**: the `upgrade`, `rollback` and `check` commands

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod upgrade;
mod version_check;
