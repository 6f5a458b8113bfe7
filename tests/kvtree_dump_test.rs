// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Exercises the `kvtree-dump` binary end to end.

use assert_cmd::Command;
use kvtree::{BPlusTree, OpenFlags};
use predicates::str::contains;
use tempfile::tempdir;

fn seed_tree(path: &std::path::Path) {
    let mut tree = BPlusTree::open(OpenFlags::create(path, 5)).unwrap();
    for k in 0..20u64 {
        tree.insert(k, k * 10).unwrap();
    }
    tree.close().unwrap();
}

#[test]
fn stats_reports_meta_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.kv");
    seed_tree(&path);

    Command::cargo_bin("kvtree-dump")
        .unwrap()
        .arg("stats")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("order:"))
        .stdout(contains("root_blkid:"));
}

#[test]
fn get_prints_matching_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.kv");
    seed_tree(&path);

    Command::cargo_bin("kvtree-dump")
        .unwrap()
        .args(["get", path.to_str().unwrap(), "7"])
        .assert()
        .success()
        .stdout(contains("70"));
}

#[test]
fn range_prints_values_in_bounds() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.kv");
    seed_tree(&path);

    Command::cargo_bin("kvtree-dump")
        .unwrap()
        .args(["range", path.to_str().unwrap(), "5", "7"])
        .assert()
        .success()
        .stdout(contains("50"))
        .stdout(contains("60"))
        .stdout(contains("70"));
}

#[test]
fn stats_on_missing_file_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.kv");

    Command::cargo_bin("kvtree-dump")
        .unwrap()
        .arg("stats")
        .arg(&path)
        .assert()
        .failure();
}
