// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Row shape shared by the table layer.

/// A fixed-width vector of `u64` properties, one per table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(Vec<u64>);

impl Row {
    pub fn new(columns: usize) -> Row {
        Row(vec![0u64; columns])
    }

    pub fn from_values(values: Vec<u64>) -> Row {
        Row(values)
    }

    pub fn get_property(&self, column: u64) -> u64 {
        self.0[column as usize]
    }

    pub fn set_property(&mut self, column: u64, value: u64) {
        self.0[column as usize] = value;
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        self.0.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    pub(crate) fn decode(bytes: &[u8]) -> Row {
        Row(bytes.chunks_exact(8).map(|c| u64::from_be_bytes(c.try_into().unwrap())).collect())
    }
}
