// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Paged file (C2): reads and writes fixed-size blocks at block-id offsets
//! in a backing file. The file descriptor is opened lazily on first I/O.

use crate::error::{TreeError, TreeResult};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A flat file of fixed-size blocks, addressed by block-id.
pub struct PagedFile {
    path: PathBuf,
    file: Option<File>,
    block_size: usize,
}

impl PagedFile {
    pub fn new(path: impl Into<PathBuf>, block_size: usize) -> PagedFile {
        PagedFile {
            path: path.into(),
            file: None,
            block_size,
        }
    }

    pub fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size;
    }

    fn open_if_needed(&mut self) -> TreeResult<&mut File> {
        if self.file.is_none() {
            log::debug!("opening backing file {}", self.path.display());
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(&self.path)
                .map_err(|e| TreeError::Io {
                    operation: format!("open '{}'", self.path.display()),
                    reason: e.to_string(),
                })?;
            self.file = Some(file);
        }
        Ok(self.file.as_mut().unwrap())
    }

    /// Reads exactly `size` bytes starting at `block_id * block_size`. A
    /// short read is fatal and surfaces as an `Io` error.
    pub fn load(&mut self, block_id: u64, size: usize) -> TreeResult<Vec<u8>> {
        let offset = block_id * self.block_size as u64;
        let file = self.open_if_needed()?;
        file.seek(SeekFrom::Start(offset)).map_err(|e| TreeError::Io {
            operation: format!("seek to block {}", block_id),
            reason: e.to_string(),
        })?;
        let mut buf = vec![0u8; size];
        file.read_exact(&mut buf).map_err(|e| TreeError::Io {
            operation: format!("read block {} ({} bytes)", block_id, size),
            reason: e.to_string(),
        })?;
        log::trace!("loaded block {} ({} bytes)", block_id, size);
        Ok(buf)
    }

    /// Writes `src` in full starting at `block_id * block_size`. A short
    /// write is fatal and surfaces as an `Io` error.
    pub fn store(&mut self, block_id: u64, src: &[u8]) -> TreeResult<()> {
        let offset = block_id * self.block_size as u64;
        let file = self.open_if_needed()?;
        file.seek(SeekFrom::Start(offset)).map_err(|e| TreeError::Io {
            operation: format!("seek to block {}", block_id),
            reason: e.to_string(),
        })?;
        file.write_all(src).map_err(|e| TreeError::Io {
            operation: format!("write block {} ({} bytes)", block_id, src.len()),
            reason: e.to_string(),
        })?;
        log::trace!("stored block {} ({} bytes)", block_id, src.len());
        Ok(())
    }

    /// Flushes the OS write buffer and, if requested, fsyncs the descriptor.
    /// `fsync` is an explicit opt-in (§4.2): this core never does it silently.
    pub fn sync(&mut self, fsync: bool) -> TreeResult<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush().map_err(|e| TreeError::Io {
                operation: "flush backing file".to_string(),
                reason: e.to_string(),
            })?;
            if fsync {
                file.sync_all().map_err(|e| TreeError::Io {
                    operation: "fsync backing file".to_string(),
                    reason: e.to_string(),
                })?;
            }
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "paged_file_test.rs"]
mod paged_file_test;
