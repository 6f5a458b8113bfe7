// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Table layer (C7): a directory of fixed-width rows plus zero or more
//! per-column B+tree indexes, built entirely on the tree's public
//! operations (§6 "Table layer detail"). The tree never sees rows; the
//! table never reaches into block layout.

pub mod types;

pub use types::Row;

use crate::btree::{BPlusTree, OpenFlags, Values};
use crate::error::{TreeError, TreeResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Flags controlling [`Table::open`], mirroring [`OpenFlags`] at the table
/// granularity.
#[derive(Debug, Clone)]
pub struct TableOpenFlag {
    pub dir: PathBuf,
    pub columns: u32,
    pub order: u32,
    pub create_if_missing: bool,
    pub error_if_exist: bool,
}

struct TableInner {
    rows: crate::btree::paged_file::PagedFile,
    next_row_id: u64,
    indices: HashMap<u64, BPlusTree>,
}

/// A table: fixed-width rows under `dir/rows.data`, indexed on demand by
/// `dir/column<N>.index` trees. Every call is serialized through a single
/// mutex (§5); the table is safe to share across threads, not lock-free.
pub struct Table {
    dir: PathBuf,
    columns: u32,
    order: u32,
    inner: Mutex<TableInner>,
}

fn column_index_path(dir: &Path, column: u64) -> PathBuf {
    dir.join(format!("column{}.index", column))
}

fn parse_column_file(name: &str) -> Option<u64> {
    name.strip_prefix("column")?.strip_suffix(".index")?.parse().ok()
}

impl Table {
    /// Opens or creates a table directory, loading whichever column
    /// indexes are already present under it. A table with no index files
    /// yet is legal; rows can be appended before any column is indexed.
    pub fn open(flag: TableOpenFlag) -> TreeResult<Table> {
        let exists = flag.dir.exists();
        if exists && flag.error_if_exist {
            return Err(TreeError::AlreadyExists { path: flag.dir });
        }
        if !exists {
            if !flag.create_if_missing {
                return Err(TreeError::NotFound { path: flag.dir });
            }
            fs::create_dir_all(&flag.dir).map_err(|e| TreeError::Io {
                operation: format!("create table dir '{}'", flag.dir.display()),
                reason: e.to_string(),
            })?;
        }

        let mut indices = HashMap::new();
        let entries = fs::read_dir(&flag.dir).map_err(|e| TreeError::Io {
            operation: format!("read table dir '{}'", flag.dir.display()),
            reason: e.to_string(),
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| TreeError::Io {
                operation: "read table dir entry".to_string(),
                reason: e.to_string(),
            })?;
            let name = entry.file_name();
            let Some(column) = name.to_str().and_then(parse_column_file) else {
                continue;
            };
            let tree = BPlusTree::open(OpenFlags::open_existing(column_index_path(&flag.dir, column)))?;
            indices.insert(column, tree);
        }

        let rows_path = flag.dir.join("rows.data");
        let row_block_size = flag.columns as usize * 8;
        let rows = crate::btree::paged_file::PagedFile::new(&rows_path, row_block_size);
        let next_row_id = fs::metadata(&rows_path).map(|m| m.len() / row_block_size.max(1) as u64).unwrap_or(0);

        log::debug!(
            "opened table at {} ({} columns, {} indexed, {} rows)",
            flag.dir.display(),
            flag.columns,
            indices.len(),
            next_row_id
        );

        Ok(Table {
            dir: flag.dir,
            columns: flag.columns,
            order: flag.order,
            inner: Mutex::new(TableInner {
                rows,
                next_row_id,
                indices,
            }),
        })
    }

    /// Appends `row`, fanning its value out to every currently indexed
    /// column. Returns the assigned row-id.
    pub fn table_append(&self, row: &Row) -> TreeResult<u64> {
        assert_eq!(row.len(), self.columns as usize, "row width does not match table column count");
        let mut inner = self.inner.lock().unwrap();
        let row_id = inner.next_row_id;
        inner.rows.store(row_id, &row.encode())?;
        inner.next_row_id += 1;

        for (&column, tree) in inner.indices.iter_mut() {
            tree.insert(row.get_property(column), row_id)?;
        }
        Ok(row_id)
    }

    /// Opens (creating if necessary) the index for `column` and backfills
    /// it from every existing row. Returns `true` if the index was already
    /// open, in which case this call is a no-op.
    pub fn table_create_index(&self, column: u64) -> TreeResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner.indices.contains_key(&column) {
            return Ok(true);
        }

        let path = column_index_path(&self.dir, column);
        let mut tree = BPlusTree::open(OpenFlags::create(path, self.order))?;
        for row_id in 0..inner.next_row_id {
            let bytes = inner.rows.load(row_id, self.columns as usize * 8)?;
            let row = Row::decode(&bytes);
            tree.insert(row.get_property(column), row_id)?;
        }
        inner.indices.insert(column, tree);
        log::debug!("created index for column {} backfilled with {} rows", column, inner.next_row_id);
        Ok(false)
    }

    pub fn table_search(&self, column: u64, value: u64, limit: usize) -> TreeResult<Values> {
        let mut inner = self.inner.lock().unwrap();
        let tree = inner.indices.get_mut(&column).ok_or(TreeError::IndexNotFound { column })?;
        tree.point_search(limit, value)
    }

    pub fn table_search_range(&self, column: u64, min_value: u64, max_value: u64, limit: usize) -> TreeResult<Values> {
        let mut inner = self.inner.lock().unwrap();
        let tree = inner.indices.get_mut(&column).ok_or(TreeError::IndexNotFound { column })?;
        tree.range_search(limit, min_value, max_value)
    }

    pub fn table_flush(&self) -> TreeResult<()> {
        let mut inner = self.inner.lock().unwrap();
        for tree in inner.indices.values_mut() {
            tree.flush()?;
        }
        inner.rows.sync(false)?;
        Ok(())
    }

    pub fn table_close(self) -> TreeResult<()> {
        self.table_flush()
    }
}
