// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width `u64 -> u64` B+tree multimap, persisted as a single flat
//! file of fixed-size blocks.
//!
//! `types` and `codec` (C1) define the on-disk layout; `paged_file` (C2)
//! moves blocks to and from disk; `cache` (C3) keeps loaded nodes resident
//! and tracks which must be written back; `tree` (C4/C5/C6) is the public
//! tree engine: descent, insert-with-split, search, and lifecycle.

pub mod cache;
pub mod codec;
pub mod paged_file;
pub mod tree;
pub mod types;

pub use codec::{Meta, Node};
pub use tree::{BPlusTree, OpenFlags};
pub use types::{NodeType, Order, Values};
