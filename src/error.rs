// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Error types for kvtree operations.

use std::fmt;
use std::path::PathBuf;

/// Standard Result type for all kvtree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Error types for kvtree operations.
#[derive(Debug, Clone)]
pub enum TreeError {
    /// Invalid argument to `open` or a constructor (bad order, conflicting flags, ...).
    ArgumentError { reason: String },

    /// I/O error during file operations (short read/write, seek, open).
    Io { operation: String, reason: String },

    /// On-disk format error (magic mismatch, truncated record, bad bitset).
    FormatError { reason: String },

    /// Internal state contradicts a data-model invariant. Always a programming bug.
    InvariantViolation { reason: String },

    /// `open` requested an existing path without `create_if_missing`.
    NotFound { path: PathBuf },

    /// `open` requested a fresh path with `error_if_exist` but the path exists.
    AlreadyExists { path: PathBuf },

    /// Table-layer lookup against a column with no open index.
    IndexNotFound { column: u64 },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgumentError { reason } => write!(f, "invalid argument: {}", reason),
            Self::Io { operation, reason } => write!(f, "I/O error during '{}': {}", operation, reason),
            Self::FormatError { reason } => write!(f, "format error: {}", reason),
            Self::InvariantViolation { reason } => write!(f, "invariant violation: {}", reason),
            Self::NotFound { path } => write!(f, "path not found: {}", path.display()),
            Self::AlreadyExists { path } => write!(f, "path already exists: {}", path.display()),
            Self::IndexNotFound { column } => write!(f, "no index open on column {}", column),
        }
    }
}

impl std::error::Error for TreeError {}

impl From<std::io::Error> for TreeError {
    fn from(err: std::io::Error) -> Self {
        TreeError::Io {
            operation: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
