//! Core types shared by every part of artup.
//!
//! This module holds the error vocabulary of the crate: the typed failures of
//! the update protocol and of version checking, plus the [`ErrorContext`]
//! used by the CLI to present them.

pub mod error;

pub use error::{
    BackupError, ErrorContext, FetchError, IntegrityError, UpdateError, UpdateErrorKind,
    VersionCheckError, user_friendly_error,
};
