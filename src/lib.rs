// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! kvtree - an embedded, single-process, on-disk B+tree key-value index.
//!
//! A fixed-width `u64 -> u64` multimap persisted as a single flat file of
//! fixed-size blocks, plus a thin tabular layer (`tables`) that opens one
//! tree per indexed column.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kvtree::{BPlusTree, OpenFlags};
//!
//! let mut tree = BPlusTree::open(OpenFlags::create("example.kv", 101))?;
//! tree.insert(42, 1)?;
//! tree.insert(42, 2)?;
//! let values = tree.point_search(usize::MAX, 42)?;
//! assert_eq!(values.as_slice(), &[1, 2]);
//! tree.close()?;
//! # Ok::<(), kvtree::TreeError>(())
//! ```
//!
//! ## Architecture
//!
//! - **btree**: block codec, paged file I/O, node cache, and the tree
//!   engine itself (open/insert/search/flush/close).
//! - **tables**: one tree per indexed column, fanning row writes out and
//!   delegating lookups.
//! - **config**: TOML-backed runtime configuration.
//! - **error**: the single typed error carried across every fallible call.

pub mod btree;
pub mod config;
pub mod error;
pub mod tables;

pub use btree::{BPlusTree, NodeType, OpenFlags, Order, Values};
pub use config::Config;
pub use error::{TreeError, TreeResult};
pub use tables::{Row, Table, TableOpenFlag};
