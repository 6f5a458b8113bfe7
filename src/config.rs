// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! File-backed configuration for embedding applications.
//!
//! Every knob here has a hard-coded fallback, so a config file is optional.

use crate::error::{TreeError, TreeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum legal tree order (see [`crate::btree::Order`]).
const MIN_ORDER: u32 = 3;

/// Knobs an embedding application can set without recompiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Order used when a tree or table column is created without an explicit override.
    pub default_order: u32,

    /// Whether `flush` additionally `fsync`s the backing file descriptor.
    pub fsync_on_flush: bool,

    /// Default directory for table column-index files.
    pub table_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_order: 101,
            fsync_on_flush: false,
            table_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file, validating the contents.
    ///
    /// Missing files are not an error condition here; callers that want
    /// "file must exist" semantics should check beforehand.
    pub fn load(path: &Path) -> TreeResult<Config> {
        let content = fs::read_to_string(path).map_err(|e| TreeError::Io {
            operation: format!("read config file '{}'", path.display()),
            reason: e.to_string(),
        })?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> TreeResult<Config> {
        let config: Config = toml::from_str(content).map_err(|e| TreeError::FormatError {
            reason: format!("TOML parse error: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> TreeResult<()> {
        if self.default_order < MIN_ORDER || self.default_order % 2 == 0 {
            return Err(TreeError::ArgumentError {
                reason: format!(
                    "default_order must be odd and >= {}, got {}",
                    MIN_ORDER, self.default_order
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
