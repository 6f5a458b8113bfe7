// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tree engine (C4) and lifecycle (C6): root-to-leaf navigation, leaf
//! insert, cascading split with sibling and parent relinking, root
//! promotion, and open/flush/close.

use crate::btree::cache::NodeCache;
use crate::btree::codec::{Meta, Node};
use crate::btree::paged_file::PagedFile;
use crate::btree::types::{NodeType, Order, Values, META_HEADER_SIZE};
use crate::error::{TreeError, TreeResult};
use std::path::PathBuf;

/// Flags controlling [`BPlusTree::open`].
#[derive(Debug, Clone)]
pub struct OpenFlags {
    pub path: PathBuf,
    /// Order to use when creating a new tree. Ignored when opening an
    /// existing file; the on-disk order always wins there.
    pub order: Option<u32>,
    pub create_if_missing: bool,
    pub error_if_exist: bool,
}

impl OpenFlags {
    pub fn create(path: impl Into<PathBuf>, order: u32) -> OpenFlags {
        OpenFlags {
            path: path.into(),
            order: Some(order),
            create_if_missing: true,
            error_if_exist: false,
        }
    }

    pub fn open_existing(path: impl Into<PathBuf>) -> OpenFlags {
        OpenFlags {
            path: path.into(),
            order: None,
            create_if_missing: false,
            error_if_exist: false,
        }
    }
}

struct SplitResult {
    split_key: u64,
    sibling_id: u64,
    was_root: bool,
}

/// A fixed-width `u64 -> u64` multimap, persisted as a B+tree in a single
/// backing file.
pub struct BPlusTree {
    meta: Meta,
    cache: NodeCache,
    fsync_on_flush: bool,
}

impl BPlusTree {
    /// Opens an existing tree file or creates a new one, per `flag`.
    ///
    /// ## Input
    /// - `flag.path`: backing file path.
    /// - `flag.order`: required when creating; ignored when opening (the
    ///   on-disk order always wins).
    /// - `flag.create_if_missing` / `flag.error_if_exist`: standard
    ///   create/open-exclusive semantics.
    ///
    /// ## Error Conditions
    /// - `AlreadyExists` if the path exists and `error_if_exist` is set.
    /// - `NotFound` if the path is absent and `create_if_missing` is unset.
    /// - `ArgumentError` if creating without a valid odd order `>= 3`.
    /// - `FormatError` if an existing file's magic does not match.
    pub fn open(flag: OpenFlags) -> TreeResult<BPlusTree> {
        let exists = flag.path.exists();
        if exists && flag.error_if_exist {
            return Err(TreeError::AlreadyExists { path: flag.path });
        }
        if exists {
            return Self::open_existing(flag.path);
        }
        if !flag.create_if_missing {
            return Err(TreeError::NotFound { path: flag.path });
        }
        let order_val = flag.order.ok_or_else(|| TreeError::ArgumentError {
            reason: "order is required when creating a new tree".to_string(),
        })?;
        Self::create(flag.path, order_val)
    }

    fn open_existing(path: PathBuf) -> TreeResult<BPlusTree> {
        // block_size isn't known yet; the meta record's fixed header
        // always lands at file offset 0 regardless of block size.
        let mut bootstrap = PagedFile::new(&path, 0);
        let header = bootstrap.load(0, META_HEADER_SIZE)?;
        let meta = Meta::decode_header(&header)?;
        let order = Order::new(meta.order)?;

        let paged_file = PagedFile::new(&path, meta.block_size);
        let mut cache = NodeCache::new(paged_file, order, meta.max_blkid);
        cache.get(meta.root_blkid)?;

        log::debug!(
            "opened tree at {} (order {}, {} blocks, root {})",
            path.display(),
            order.value(),
            meta.block_count,
            meta.root_blkid
        );
        Ok(BPlusTree {
            meta,
            cache,
            fsync_on_flush: false,
        })
    }

    fn create(path: PathBuf, order_val: u32) -> TreeResult<BPlusTree> {
        let order = Order::new(order_val)?;
        let block_size = order.block_size();

        let mut meta = Meta {
            order: order.value(),
            block_size,
            root_blkid: 0,
            block_count: 1,
            max_blkid: 0,
            dirty: true,
        };
        let paged_file = PagedFile::new(&path, block_size);
        let mut cache = NodeCache::new(paged_file, order, 0);

        meta.max_blkid += 1;
        meta.block_count = meta.max_blkid + 1;
        meta.root_blkid = meta.max_blkid;

        let root_id = meta.root_blkid;
        let root = Node::new(root_id, NodeType::LEAF | NodeType::ROOT, order);
        cache.install(root_id, root);
        cache.mark_new(root_id);

        log::debug!("created tree at {} (order {})", path.display(), order.value());
        Ok(BPlusTree {
            meta,
            cache,
            fsync_on_flush: false,
        })
    }

    pub fn order(&self) -> Order {
        self.cache.order()
    }

    pub fn root_blkid(&self) -> u64 {
        self.meta.root_blkid
    }

    pub fn max_blkid(&self) -> u64 {
        self.meta.max_blkid
    }

    pub fn block_count(&self) -> u64 {
        self.meta.block_count
    }

    pub fn set_fsync_on_flush(&mut self, fsync: bool) {
        self.fsync_on_flush = fsync;
    }

    fn allocate_fresh(&mut self) -> u64 {
        self.meta.max_blkid += 1;
        self.meta.block_count = self.meta.max_blkid + 1;
        self.meta.dirty = true;
        self.meta.max_blkid
    }

    fn descend_to_leaf(&mut self, key: u64) -> TreeResult<u64> {
        let mut cur = self.meta.root_blkid;
        loop {
            let is_leaf = self.cache.get(cur)?.is_leaf();
            if is_leaf {
                return Ok(cur);
            }
            let child_id = {
                let node = self.cache.get(cur)?;
                let idx = node.find_child_index(key);
                node.child(idx)
            };
            cur = child_id;
        }
    }

    /// Inserts `(key, value)`. Duplicate keys are permitted; the tree is a
    /// multimap.
    ///
    /// ## Performance
    /// O(log n) node-touches worst case (§6).
    pub fn insert(&mut self, key: u64, value: u64) -> TreeResult<()> {
        let leaf_id = self.descend_to_leaf(key)?;
        {
            let leaf = self.cache.get_mut(leaf_id)?;
            leaf.leaf_insert_sorted(key, value);
        }
        self.cache.mark_dirty(leaf_id);

        let overflowed = self.cache.get(leaf_id)?.key_count() == self.order().max_keys() + 1;
        if overflowed {
            self.split_and_promote(leaf_id)?;
        }
        Ok(())
    }

    fn split_and_promote(&mut self, mut node_id: u64) -> TreeResult<()> {
        loop {
            let split = self.split_node(node_id)?;
            if split.was_root {
                self.promote_new_root(node_id, &split)?;
                return Ok(());
            }

            let parent_id = self.cache.get(node_id)?.parent();
            self.insert_into_parent(parent_id, node_id, &split)?;

            let parent_overflowed =
                self.cache.get(parent_id)?.key_count() == self.order().max_keys() + 1;
            if !parent_overflowed {
                return Ok(());
            }
            node_id = parent_id;
        }
    }

    fn split_node(&mut self, id: u64) -> TreeResult<SplitResult> {
        let order = self.order();
        let min_keys = order.min_keys();

        let (was_root, is_leaf, key_count, parent_id, right_sibling_id) = {
            let node = self.cache.get(id)?;
            (
                node.is_root(),
                node.is_leaf(),
                node.key_count(),
                node.parent(),
                node.right_sibling(),
            )
        };
        debug_assert_eq!(key_count, order.max_keys() + 1);

        let split_key = self.cache.get(id)?.key(min_keys);
        let sibling_id = self.allocate_fresh();
        let base_type = if is_leaf { NodeType::LEAF } else { NodeType::INTERNAL };
        let mut sibling = Node::new(sibling_id, base_type, order);
        sibling.set_parent(parent_id);

        if is_leaf {
            let n_keep = min_keys + 1;
            let n_move = key_count - n_keep;
            sibling.copy_tail_half(self.cache.get(id)?, n_keep, n_move);
            sibling.set_key_count(n_move);
            sibling.set_right_sibling(right_sibling_id);
            sibling.set_left_sibling(id);

            {
                let node = self.cache.get_mut(id)?;
                node.set_key_count(n_keep);
                node.set_right_sibling(sibling_id);
            }

            if right_sibling_id != 0 {
                {
                    let rs = self.cache.get_mut(right_sibling_id)?;
                    rs.set_left_sibling(sibling_id);
                }
                self.cache.mark_dirty(right_sibling_id);
            }
        } else {
            sibling.copy_tail_half(self.cache.get(id)?, min_keys + 1, min_keys);
            sibling.set_key_count(min_keys);

            {
                let node = self.cache.get_mut(id)?;
                node.set_key_count(min_keys);
            }

            for i in 0..=min_keys {
                let child_id = sibling.child(i);
                {
                    let child = self.cache.get_mut(child_id)?;
                    child.set_parent(sibling_id);
                }
                self.cache.mark_dirty(child_id);
            }
        }

        self.cache.install(sibling_id, sibling);
        self.cache.mark_new(sibling_id);
        self.cache.mark_dirty(id);

        {
            let node = self.cache.get_mut(id)?;
            node.set_root(false);
        }

        log::debug!(
            "split block {} -> sibling {} (split_key {})",
            id,
            sibling_id,
            split_key
        );

        Ok(SplitResult {
            split_key,
            sibling_id,
            was_root,
        })
    }

    fn promote_new_root(&mut self, left_id: u64, split: &SplitResult) -> TreeResult<()> {
        let order = self.order();
        let new_root_id = self.allocate_fresh();
        let mut new_root = Node::new(new_root_id, NodeType::ROOT | NodeType::INTERNAL, order);
        new_root.set_key_count(1);
        new_root.set_key(0, split.split_key);
        new_root.set_child(0, left_id);
        new_root.set_child(1, split.sibling_id);
        self.cache.install(new_root_id, new_root);
        self.cache.mark_new(new_root_id);

        {
            let left = self.cache.get_mut(left_id)?;
            left.set_parent(new_root_id);
        }
        self.cache.mark_dirty(left_id);
        {
            let sibling = self.cache.get_mut(split.sibling_id)?;
            sibling.set_parent(new_root_id);
        }
        self.cache.mark_dirty(split.sibling_id);

        self.meta.root_blkid = new_root_id;
        self.meta.dirty = true;
        log::debug!("promoted new root {} (split_key {})", new_root_id, split.split_key);
        Ok(())
    }

    fn insert_into_parent(&mut self, parent_id: u64, left_id: u64, split: &SplitResult) -> TreeResult<()> {
        let child_index = self.cache.get(parent_id)?.find_child_slot(left_id);
        {
            let parent = self.cache.get_mut(parent_id)?;
            parent.shift_slots_right(child_index);
            parent.set_key_count(parent.key_count() + 1);
            parent.set_key(child_index, split.split_key);
            parent.set_child(child_index + 1, split.sibling_id);
            parent.set_child(child_index, left_id);
        }
        self.cache.mark_dirty(parent_id);

        {
            let sibling = self.cache.get_mut(split.sibling_id)?;
            sibling.set_parent(parent_id);
        }
        self.cache.mark_dirty(split.sibling_id);
        Ok(())
    }

    /// Point lookup with a multiplicity limit.
    ///
    /// ## Output
    /// Values in leaf-chain order, which is also insertion order among
    /// duplicates of `key`. Stops as soon as `limit` is reached, a key
    /// other than `key` is seen, or the leaf chain ends.
    pub fn point_search(&mut self, limit: usize, key: u64) -> TreeResult<Values> {
        if limit == 0 {
            return Ok(Values::new(Vec::new()));
        }
        let mut out = Vec::new();
        let mut leaf_id = self.descend_to_leaf(key)?;

        loop {
            let (done, right_sibling) = {
                let leaf = self.cache.get(leaf_id)?;
                let mut i = leaf.find_first_ge(key);
                while i < leaf.key_count() && leaf.key(i) == key && out.len() < limit {
                    out.push(leaf.value(i));
                    i += 1;
                }
                let stop = out.len() >= limit || (i < leaf.key_count() && leaf.key(i) != key);
                (stop, leaf.right_sibling())
            };
            if done || right_sibling == 0 {
                break;
            }
            leaf_id = right_sibling;
        }
        Ok(Values::new(out))
    }

    /// Closed-interval range scan `[key_min, key_max]` across the leaf chain.
    pub fn range_search(&mut self, limit: usize, key_min: u64, key_max: u64) -> TreeResult<Values> {
        if limit == 0 || key_min > key_max {
            return Ok(Values::new(Vec::new()));
        }
        let mut out = Vec::new();
        let mut leaf_id = self.descend_to_leaf(key_min)?;

        'outer: loop {
            let right_sibling = {
                let leaf = self.cache.get(leaf_id)?;
                let mut i = leaf.find_first_ge(key_min);
                while i < leaf.key_count() {
                    let k = leaf.key(i);
                    if k > key_max {
                        break 'outer;
                    }
                    out.push(leaf.value(i));
                    if out.len() >= limit {
                        break 'outer;
                    }
                    i += 1;
                }
                leaf.right_sibling()
            };
            if right_sibling == 0 {
                break;
            }
            leaf_id = right_sibling;
        }
        Ok(Values::new(out))
    }

    /// Persists the meta record (if dirty) and every new/dirty node, then
    /// reclassifies them as clean. Does not `fsync` unless
    /// [`BPlusTree::set_fsync_on_flush`] was set.
    pub fn flush(&mut self) -> TreeResult<()> {
        if self.meta.dirty {
            let bytes = self.meta.encode();
            self.cache.paged_file_mut().store(0, &bytes)?;
            self.meta.dirty = false;
        }

        let new_ids: Vec<u64> = self.cache.new_ids().collect();
        for id in &new_ids {
            let bytes = self.cache.get(*id)?.encode();
            self.cache.paged_file_mut().store(*id, &bytes)?;
        }
        let dirty_ids: Vec<u64> = self.cache.dirty_ids().collect();
        for id in &dirty_ids {
            let bytes = self.cache.get(*id)?.encode();
            self.cache.paged_file_mut().store(*id, &bytes)?;
        }

        self.cache.paged_file_mut().sync(self.fsync_on_flush)?;
        self.cache.clear_tracking();
        log::debug!("flushed {} new, {} dirty blocks", new_ids.len(), dirty_ids.len());
        Ok(())
    }

    /// Flushes and releases every owned resource. The file descriptor closes
    /// implicitly when the tree is dropped.
    pub fn close(mut self) -> TreeResult<()> {
        self.flush()
    }

    /// Walks every block in `[1, max_blkid]` and tallies `(leaf, internal)`
    /// node counts. Diagnostic only; not part of the query surface.
    pub fn node_type_counts(&mut self) -> TreeResult<(u64, u64)> {
        let (mut leaves, mut internals) = (0u64, 0u64);
        for id in 1..=self.meta.max_blkid {
            let node = self.cache.get(id)?;
            if node.is_leaf() {
                leaves += 1;
            } else {
                internals += 1;
            }
        }
        Ok((leaves, internals))
    }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
