// SPDX-License-Identifier: Apache-2.0

use alloc::vec::Vec;

/// Error type for InputBuffer operations.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// A single-byte read past the end of the data.
    IndexOutOfBounds,
    /// Invalid slice bounds provided.
    InvalidSliceBounds,
}

/// The raw SNBT bytes owned by a scanner, with bounds-checked access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputBuffer {
    data: Vec<u8>,
}

impl InputBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Gets the byte at `index`, with bounds checking.
    pub fn byte(&self, index: usize) -> Result<u8, Error> {
        self.data.get(index).copied().ok_or(Error::IndexOutOfBounds)
    }

    /// Gets a slice of the data from start to end positions, with bounds checking.
    pub fn slice(&self, start: usize, end: usize) -> Result<&[u8], Error> {
        self.data.get(start..end).ok_or(Error::InvalidSliceBounds)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
