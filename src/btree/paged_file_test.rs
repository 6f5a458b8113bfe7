use super::*;
use tempfile::tempdir;

#[test]
fn store_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("blocks.bin");
    let mut pf = PagedFile::new(&path, 16);

    pf.store(0, &[1u8; 16]).unwrap();
    pf.store(1, &[2u8; 16]).unwrap();

    let block0 = pf.load(0, 16).unwrap();
    let block1 = pf.load(1, 16).unwrap();
    assert_eq!(block0, vec![1u8; 16]);
    assert_eq!(block1, vec![2u8; 16]);
}

#[test]
fn load_beyond_eof_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("blocks.bin");
    let mut pf = PagedFile::new(&path, 16);
    pf.store(0, &[0u8; 16]).unwrap();

    let err = pf.load(5, 16).unwrap_err();
    assert!(matches!(err, TreeError::Io { .. }));
}

#[test]
fn file_is_created_lazily_on_first_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lazy.bin");
    assert!(!path.exists());
    let mut pf = PagedFile::new(&path, 8);
    pf.store(0, &[9u8; 8]).unwrap();
    assert!(path.exists());
}
