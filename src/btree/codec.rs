// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Block codec (C1): packs and unpacks a node's header and payload over a
//! fixed-size byte buffer, and the meta record (block 0) alongside it.
//!
//! All on-disk 8-byte fields are big-endian; this file is the only place
//! that choice is made.

use crate::btree::types::{Order, NodeType, META_HEADER_SIZE, META_MAGIC, NODE_HEADER_SIZE, WORD_SIZE};
use crate::error::{TreeError, TreeResult};

fn slot_offset(i: u64) -> usize {
    (WORD_SIZE * 2) * i as usize
}

fn key_offset(i: u64) -> usize {
    slot_offset(i) + WORD_SIZE
}

/// In-memory representation of the meta record (block 0).
#[derive(Debug, Clone)]
pub struct Meta {
    pub order: u32,
    pub block_size: usize,
    pub root_blkid: u64,
    pub block_count: u64,
    pub max_blkid: u64,
    pub dirty: bool,
}

impl Meta {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.block_size];
        buf[0..8].copy_from_slice(&META_MAGIC.to_be_bytes());
        buf[8..16].copy_from_slice(&(self.order as u64).to_be_bytes());
        buf[16..24].copy_from_slice(&(self.block_size as u64).to_be_bytes());
        buf[24..32].copy_from_slice(&self.root_blkid.to_be_bytes());
        buf[32..40].copy_from_slice(&self.block_count.to_be_bytes());
        buf[40..48].copy_from_slice(&self.max_blkid.to_be_bytes());
        // Bytes [48..block_size) are already zero-initialized padding.
        buf
    }

    /// Decodes the fixed-size header portion of a meta record. `bytes` must
    /// be at least [`META_HEADER_SIZE`] long; this is what bootstrap reads
    /// during `open` before `block_size` itself is known.
    pub fn decode_header(bytes: &[u8]) -> TreeResult<Meta> {
        if bytes.len() < META_HEADER_SIZE {
            return Err(TreeError::FormatError {
                reason: format!(
                    "meta record too short: {} bytes, need at least {}",
                    bytes.len(),
                    META_HEADER_SIZE
                ),
            });
        }
        let magic = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        if magic != META_MAGIC {
            return Err(TreeError::FormatError {
                reason: format!("meta magic mismatch: expected {:#x}, got {:#x}", META_MAGIC, magic),
            });
        }
        let order = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
        let block_size = u64::from_be_bytes(bytes[16..24].try_into().unwrap());
        let root_blkid = u64::from_be_bytes(bytes[24..32].try_into().unwrap());
        let block_count = u64::from_be_bytes(bytes[32..40].try_into().unwrap());
        let max_blkid = u64::from_be_bytes(bytes[40..48].try_into().unwrap());
        Ok(Meta {
            order: order as u32,
            block_size: block_size as usize,
            root_blkid,
            block_count,
            max_blkid,
            dirty: false,
        })
    }
}

/// In-memory representation of one node record (block-id >= 1).
///
/// The payload buffer is over-allocated by one `(slot, key)` pair beyond
/// what `block_size` holds on disk, so a `(max_keys + 1)`-th entry can be
/// written legally between a mutation and the split that follows it.
#[derive(Debug, Clone)]
pub struct Node {
    pub block_id: u64,
    node_type: NodeType,
    key_count: u64,
    parent: u64,
    left_sibling: u64,
    right_sibling: u64,
    payload: Vec<u8>,
    order: Order,
}

impl Node {
    pub fn new(block_id: u64, node_type: NodeType, order: Order) -> Node {
        Node {
            block_id,
            node_type,
            key_count: 0,
            parent: 0,
            left_sibling: 0,
            right_sibling: 0,
            payload: vec![0u8; order.payload_capacity()],
            order,
        }
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn is_leaf(&self) -> bool {
        self.node_type.is_leaf()
    }

    pub fn is_internal(&self) -> bool {
        self.node_type.is_internal()
    }

    pub fn is_root(&self) -> bool {
        self.node_type.is_root()
    }

    pub fn set_root(&mut self, is_root: bool) {
        if is_root {
            self.node_type.insert(NodeType::ROOT);
        } else {
            self.node_type.remove(NodeType::ROOT);
        }
    }

    pub fn key_count(&self) -> u64 {
        self.key_count
    }

    pub fn parent(&self) -> u64 {
        self.parent
    }

    pub fn set_parent(&mut self, id: u64) {
        self.parent = id;
    }

    pub fn left_sibling(&self) -> u64 {
        self.left_sibling
    }

    pub fn set_left_sibling(&mut self, id: u64) {
        self.left_sibling = id;
    }

    pub fn right_sibling(&self) -> u64 {
        self.right_sibling
    }

    pub fn set_right_sibling(&mut self, id: u64) {
        self.right_sibling = id;
    }

    pub fn key(&self, i: u64) -> u64 {
        assert!(i < self.key_count, "key index {} out of bounds ({})", i, self.key_count);
        let off = key_offset(i);
        u64::from_be_bytes(self.payload[off..off + WORD_SIZE].try_into().unwrap())
    }

    pub fn set_key(&mut self, i: u64, k: u64) {
        assert!(i < self.key_count, "key index {} out of bounds ({})", i, self.key_count);
        let off = key_offset(i);
        self.payload[off..off + WORD_SIZE].copy_from_slice(&k.to_be_bytes());
    }

    pub fn value(&self, i: u64) -> u64 {
        assert!(self.is_leaf(), "value() called on non-leaf node");
        assert!(i < self.key_count, "value index {} out of bounds ({})", i, self.key_count);
        let off = slot_offset(i);
        u64::from_be_bytes(self.payload[off..off + WORD_SIZE].try_into().unwrap())
    }

    pub fn set_value(&mut self, i: u64, v: u64) {
        assert!(self.is_leaf(), "set_value() called on non-leaf node");
        assert!(i < self.key_count, "value index {} out of bounds ({})", i, self.key_count);
        let off = slot_offset(i);
        self.payload[off..off + WORD_SIZE].copy_from_slice(&v.to_be_bytes());
    }

    pub fn child(&self, i: u64) -> u64 {
        assert!(self.is_internal(), "child() called on non-internal node");
        assert!(i <= self.key_count, "child index {} out of bounds ({})", i, self.key_count);
        let off = slot_offset(i);
        u64::from_be_bytes(self.payload[off..off + WORD_SIZE].try_into().unwrap())
    }

    pub fn set_child(&mut self, i: u64, id: u64) {
        assert!(self.is_internal(), "set_child() called on non-internal node");
        assert!(i <= self.key_count, "child index {} out of bounds ({})", i, self.key_count);
        let off = slot_offset(i);
        self.payload[off..off + WORD_SIZE].copy_from_slice(&id.to_be_bytes());
    }

    /// Opens a gap at pair-position `from` for a new `(child, key)` pair, by
    /// moving the trailing `(key_count - from)` pairs plus the terminal
    /// child one slot-pair (16 bytes) to the right.
    pub fn shift_slots_right(&mut self, from: u64) {
        assert!(self.is_internal(), "shift_slots_right() called on non-internal node");
        let k = self.key_count;
        let src_start = slot_offset(from);
        let src_end = slot_offset(k) + WORD_SIZE;
        self.payload.copy_within(src_start..src_end, src_start + 2 * WORD_SIZE);
    }

    /// Finds the least `i` with `key(i) >= k`. Linear scan is sufficient at
    /// page-sized orders; binary search is a permitted optimization at
    /// larger orders, not exercised here.
    pub fn find_first_ge(&self, k: u64) -> u64 {
        let mut i = 0;
        while i < self.key_count && self.key(i) < k {
            i += 1;
        }
        i
    }

    /// Finds the child index to descend into for `key`: the least `i` with
    /// `key <= K_i`, else the last child.
    pub fn find_child_index(&self, key: u64) -> u64 {
        let mut i = 0;
        while i < self.key_count && key > self.key(i) {
            i += 1;
        }
        i
    }

    /// Finds the index `i` such that `child(i) == child_id`.
    pub fn find_child_slot(&self, child_id: u64) -> u64 {
        for i in 0..=self.key_count {
            if self.child(i) == child_id {
                return i;
            }
        }
        panic!("block {} is not a child of node {}", child_id, self.block_id);
    }

    /// Inserts `(k, v)` into a leaf at its sorted position, growing
    /// `key_count` by one. Callers must check for overflow afterward.
    pub fn leaf_insert_sorted(&mut self, k: u64, v: u64) {
        assert!(self.is_leaf(), "leaf_insert_sorted() called on non-leaf node");
        let i = self.find_first_ge(k);
        let src_start = slot_offset(i);
        let src_end = slot_offset(self.key_count);
        self.payload.copy_within(src_start..src_end, src_start + 2 * WORD_SIZE);
        self.payload[src_start..src_start + WORD_SIZE].copy_from_slice(&v.to_be_bytes());
        self.payload[src_start + WORD_SIZE..src_start + 2 * WORD_SIZE].copy_from_slice(&k.to_be_bytes());
        self.key_count += 1;
    }

    /// Copies `n` slot-pairs starting at position `start` of `src` into the
    /// beginning of `self`. Internal nodes also carry the trailing child
    /// (`2n + 1` words); leaves copy `2n` words. `self.key_count` is set to
    /// `n` by the caller after the copy (split bookkeeping differs between
    /// leaf and internal, so it is not folded in here).
    pub fn copy_tail_half(&mut self, src: &Node, start: u64, n: u64) {
        let word_count: u64 = if self.is_internal() { 2 * n + 1 } else { 2 * n };
        let byte_len = (word_count as usize) * WORD_SIZE;
        let src_start = slot_offset(start);
        self.payload[0..byte_len].copy_from_slice(&src.payload[src_start..src_start + byte_len]);
    }

    pub fn set_key_count(&mut self, n: u64) {
        self.key_count = n;
    }

    /// Encodes the header and the on-disk portion of the payload (excluding
    /// the overflow scratch) into exactly `order.block_size()` bytes.
    pub fn encode(&self) -> Vec<u8> {
        let block_size = self.order.block_size();
        let mut buf = vec![0u8; block_size];
        buf[0..8].copy_from_slice(&self.node_type.bits().to_be_bytes());
        buf[8..16].copy_from_slice(&self.key_count.to_be_bytes());
        buf[16..24].copy_from_slice(&self.parent.to_be_bytes());
        buf[24..32].copy_from_slice(&self.left_sibling.to_be_bytes());
        buf[32..40].copy_from_slice(&self.right_sibling.to_be_bytes());
        let payload_on_disk = block_size - NODE_HEADER_SIZE;
        buf[NODE_HEADER_SIZE..block_size].copy_from_slice(&self.payload[0..payload_on_disk]);
        buf
    }

    /// Decodes a node record read from disk. `bytes` must be exactly
    /// `order.block_size()` long.
    pub fn decode(block_id: u64, bytes: &[u8], order: Order) -> TreeResult<Node> {
        let block_size = order.block_size();
        if bytes.len() != block_size {
            return Err(TreeError::FormatError {
                reason: format!(
                    "node block {} has {} bytes, expected {}",
                    block_id,
                    bytes.len(),
                    block_size
                ),
            });
        }
        let type_bits = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        let node_type = NodeType::from_bits_retain(type_bits);
        if node_type.is_leaf() == node_type.is_internal() {
            return Err(TreeError::FormatError {
                reason: format!("node block {} has invalid type bitset {:#x}", block_id, type_bits),
            });
        }
        let key_count = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
        let parent = u64::from_be_bytes(bytes[16..24].try_into().unwrap());
        let left_sibling = u64::from_be_bytes(bytes[24..32].try_into().unwrap());
        let right_sibling = u64::from_be_bytes(bytes[32..40].try_into().unwrap());

        let mut payload = vec![0u8; order.payload_capacity()];
        let payload_on_disk = block_size - NODE_HEADER_SIZE;
        payload[0..payload_on_disk].copy_from_slice(&bytes[NODE_HEADER_SIZE..block_size]);

        Ok(Node {
            block_id,
            node_type,
            key_count,
            parent,
            left_sibling,
            right_sibling,
            payload,
            order,
        })
    }
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;
