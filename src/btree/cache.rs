// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Node cache (C3): maps block-id to loaded node, lazily loading from disk
//! on demand, and classifies each loaded node as new, dirty, or clean so
//! that `flush` writes the minimum set of blocks.

use crate::btree::codec::Node;
use crate::btree::paged_file::PagedFile;
use crate::btree::types::Order;
use crate::error::TreeResult;
use std::collections::HashSet;

pub struct NodeCache {
    paged_file: PagedFile,
    order: Order,
    nodes: Vec<Option<Node>>,
    new_ids: HashSet<u64>,
    dirty_ids: HashSet<u64>,
}

impl NodeCache {
    pub fn new(paged_file: PagedFile, order: Order, max_blkid: u64) -> NodeCache {
        let mut nodes = Vec::with_capacity(max_blkid as usize + 1);
        nodes.resize_with(max_blkid as usize + 1, || None);
        NodeCache {
            paged_file,
            order,
            nodes,
            new_ids: HashSet::new(),
            dirty_ids: HashSet::new(),
        }
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn paged_file_mut(&mut self) -> &mut PagedFile {
        &mut self.paged_file
    }

    fn grow_to(&mut self, block_id: u64) {
        if block_id as usize >= self.nodes.len() {
            self.nodes.resize_with(block_id as usize + 1, || None);
        }
    }

    /// Returns the node at `id`, lazily loading it from disk as a clean
    /// node the first time it is requested. This is the only path by which
    /// disk-resident nodes enter memory.
    pub fn get(&mut self, id: u64) -> TreeResult<&Node> {
        self.ensure_loaded(id)?;
        Ok(self.nodes[id as usize].as_ref().unwrap())
    }

    /// Returns a mutable reference to the node at `id`, lazily loading it
    /// first if needed. Callers that mutate through this method must call
    /// [`NodeCache::mark_dirty`] afterward; the cache does not infer
    /// mutation from the borrow alone.
    pub fn get_mut(&mut self, id: u64) -> TreeResult<&mut Node> {
        self.ensure_loaded(id)?;
        Ok(self.nodes[id as usize].as_mut().unwrap())
    }

    fn ensure_loaded(&mut self, id: u64) -> TreeResult<()> {
        self.grow_to(id);
        if self.nodes[id as usize].is_none() {
            let bytes = self.paged_file.load(id, self.order.block_size())?;
            let node = Node::decode(id, &bytes, self.order)?;
            log::debug!("loaded block {} from disk into cache as clean", id);
            self.nodes[id as usize] = Some(node);
        }
        Ok(())
    }

    /// Installs a freshly allocated node, growing the table if needed.
    pub fn install(&mut self, id: u64, node: Node) {
        self.grow_to(id);
        self.nodes[id as usize] = Some(node);
    }

    /// Moves `id` into the `new` set. `new` dominates `dirty` (I7).
    pub fn mark_new(&mut self, id: u64) {
        self.dirty_ids.remove(&id);
        self.new_ids.insert(id);
    }

    /// Moves `id` into the `dirty` set, unless it is already `new` or `dirty`.
    pub fn mark_dirty(&mut self, id: u64) {
        if self.new_ids.contains(&id) {
            return;
        }
        self.dirty_ids.insert(id);
    }

    pub fn is_new(&self, id: u64) -> bool {
        self.new_ids.contains(&id)
    }

    pub fn is_dirty(&self, id: u64) -> bool {
        self.dirty_ids.contains(&id)
    }

    pub fn is_clean(&self, id: u64) -> bool {
        !self.is_new(id) && !self.is_dirty(id)
    }

    pub fn new_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.new_ids.iter().copied()
    }

    pub fn dirty_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.dirty_ids.iter().copied()
    }

    /// Reclassifies every `new`/`dirty` node to `clean`, conceptually what
    /// `flush` does once the blocks have been persisted.
    pub fn clear_tracking(&mut self) {
        self.new_ids.clear();
        self.dirty_ids.clear();
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;
