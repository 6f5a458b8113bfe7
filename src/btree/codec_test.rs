use super::*;
use crate::btree::types::Order;

fn order3() -> Order {
    Order::new(3).unwrap()
}

#[test]
fn leaf_insert_sorted_keeps_order() {
    let order = order3();
    let mut leaf = Node::new(1, NodeType::LEAF | NodeType::ROOT, order);
    leaf.leaf_insert_sorted(5, 50);
    leaf.leaf_insert_sorted(1, 10);
    leaf.leaf_insert_sorted(3, 30);
    assert_eq!(leaf.key_count(), 3);
    assert_eq!((leaf.key(0), leaf.value(0)), (1, 10));
    assert_eq!((leaf.key(1), leaf.value(1)), (3, 30));
    assert_eq!((leaf.key(2), leaf.value(2)), (5, 50));
}

#[test]
fn leaf_insert_sorted_allows_overflow_entry() {
    // order 3 => max_keys = 2; the codec must tolerate a 3rd (overflow) entry
    // in memory before a split resolves it.
    let order = order3();
    let mut leaf = Node::new(1, NodeType::LEAF | NodeType::ROOT, order);
    leaf.leaf_insert_sorted(1, 1);
    leaf.leaf_insert_sorted(2, 2);
    leaf.leaf_insert_sorted(3, 3);
    assert_eq!(leaf.key_count(), 3);
    assert_eq!(leaf.key(2), 3);
}

#[test]
fn duplicate_keys_preserve_insertion_order() {
    let order = Order::new(5).unwrap();
    let mut leaf = Node::new(1, NodeType::LEAF | NodeType::ROOT, order);
    leaf.leaf_insert_sorted(7, 100);
    leaf.leaf_insert_sorted(7, 200);
    leaf.leaf_insert_sorted(7, 300);
    assert_eq!(leaf.value(0), 100);
    assert_eq!(leaf.value(1), 200);
    assert_eq!(leaf.value(2), 300);
}

#[test]
fn shift_slots_right_opens_gap_for_new_pair() {
    let order = Order::new(5).unwrap();
    let mut internal = Node::new(1, NodeType::INTERNAL, order);
    internal.set_key_count(2);
    internal.set_child(0, 10);
    internal.set_key(0, 100);
    internal.set_child(1, 11);
    internal.set_key(1, 200);
    internal.set_child(2, 12);

    internal.shift_slots_right(1);
    internal.set_key_count(3);
    internal.set_key(1, 150);
    internal.set_child(2, 99);
    internal.set_child(1, 10);

    assert_eq!(internal.child(0), 10);
    assert_eq!(internal.key(0), 100);
    assert_eq!(internal.child(1), 10);
    assert_eq!(internal.key(1), 150);
    assert_eq!(internal.child(2), 99);
    assert_eq!(internal.key(2), 200);
    assert_eq!(internal.child(3), 12);
}

#[test]
fn copy_tail_half_leaf_copies_value_key_pairs() {
    let order = order3();
    let mut src = Node::new(1, NodeType::LEAF, order);
    src.leaf_insert_sorted(1, 10);
    src.leaf_insert_sorted(2, 20);
    src.leaf_insert_sorted(3, 30);

    let mut dst = Node::new(2, NodeType::LEAF, order);
    dst.copy_tail_half(&src, 2, 1);
    dst.set_key_count(1);
    assert_eq!(dst.key(0), 3);
    assert_eq!(dst.value(0), 30);
}

#[test]
fn node_encode_decode_round_trips() {
    let order = Order::new(5).unwrap();
    let mut leaf = Node::new(3, NodeType::LEAF, order);
    leaf.leaf_insert_sorted(1, 11);
    leaf.leaf_insert_sorted(2, 22);
    leaf.set_left_sibling(2);
    leaf.set_right_sibling(4);
    leaf.set_parent(1);

    let bytes = leaf.encode();
    assert_eq!(bytes.len(), order.block_size());

    let decoded = Node::decode(3, &bytes, order).unwrap();
    assert!(decoded.is_leaf());
    assert_eq!(decoded.key_count(), 2);
    assert_eq!(decoded.key(0), 1);
    assert_eq!(decoded.value(0), 11);
    assert_eq!(decoded.left_sibling(), 2);
    assert_eq!(decoded.right_sibling(), 4);
    assert_eq!(decoded.parent(), 1);
}

#[test]
fn node_decode_rejects_bad_type_bitset() {
    let order = order3();
    let mut bytes = vec![0u8; order.block_size()];
    // Neither LEAF nor INTERNAL bit set.
    bytes[0..8].copy_from_slice(&0u64.to_be_bytes());
    let err = Node::decode(1, &bytes, order).unwrap_err();
    assert!(matches!(err, TreeError::FormatError { .. }));
}

#[test]
fn meta_encode_decode_round_trips() {
    let meta = Meta {
        order: 5,
        block_size: 88,
        root_blkid: 1,
        block_count: 2,
        max_blkid: 1,
        dirty: true,
    };
    let bytes = meta.encode();
    assert_eq!(bytes.len(), 88);
    // Padding must be zero.
    assert!(bytes[48..].iter().all(|&b| b == 0));

    let decoded = Meta::decode_header(&bytes).unwrap();
    assert_eq!(decoded.order, 5);
    assert_eq!(decoded.block_size, 88);
    assert_eq!(decoded.root_blkid, 1);
    assert_eq!(decoded.block_count, 2);
    assert_eq!(decoded.max_blkid, 1);
}

#[test]
fn meta_decode_rejects_bad_magic() {
    let bytes = vec![0u8; META_HEADER_SIZE];
    let err = Meta::decode_header(&bytes).unwrap_err();
    assert!(matches!(err, TreeError::FormatError { .. }));
}
