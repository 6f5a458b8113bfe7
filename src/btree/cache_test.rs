use super::*;
use crate::btree::codec::Node;
use crate::btree::types::NodeType;
use tempfile::tempdir;

fn order() -> Order {
    Order::new(3).unwrap()
}

#[test]
fn install_marks_new_not_dirty() {
    let dir = tempdir().unwrap();
    let pf = PagedFile::new(dir.path().join("t.bin"), order().block_size());
    let mut cache = NodeCache::new(pf, order(), 1);
    let node = Node::new(1, NodeType::LEAF | NodeType::ROOT, order());
    cache.install(1, node);
    cache.mark_new(1);
    assert!(cache.is_new(1));
    assert!(!cache.is_dirty(1));
}

#[test]
fn mark_dirty_is_noop_for_new_nodes() {
    let dir = tempdir().unwrap();
    let pf = PagedFile::new(dir.path().join("t.bin"), order().block_size());
    let mut cache = NodeCache::new(pf, order(), 1);
    cache.install(1, Node::new(1, NodeType::LEAF | NodeType::ROOT, order()));
    cache.mark_new(1);
    cache.mark_dirty(1);
    assert!(cache.is_new(1));
    assert!(!cache.is_dirty(1));
}

#[test]
fn loading_from_disk_classifies_clean() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.bin");
    let ord = order();
    {
        let mut pf = PagedFile::new(&path, ord.block_size());
        let node = Node::new(1, NodeType::LEAF | NodeType::ROOT, ord);
        pf.store(1, &node.encode()).unwrap();
    }
    let pf = PagedFile::new(&path, ord.block_size());
    let mut cache = NodeCache::new(pf, ord, 1);
    let node = cache.get(1).unwrap();
    assert!(node.is_leaf());
    assert!(cache.is_clean(1));
}

#[test]
fn clear_tracking_resets_sets() {
    let dir = tempdir().unwrap();
    let pf = PagedFile::new(dir.path().join("t.bin"), order().block_size());
    let mut cache = NodeCache::new(pf, order(), 1);
    cache.install(1, Node::new(1, NodeType::LEAF | NodeType::ROOT, order()));
    cache.mark_new(1);
    cache.clear_tracking();
    assert!(cache.is_clean(1));
}
