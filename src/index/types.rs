//! Core types for the in-memory index

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense document number (0..max_doc), assigned in insertion order
///
/// Re-indexing a document id allocates a fresh number, so a larger number
/// always means a later insertion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocNo(pub u32);

impl DocNo {
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DocNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc_{}", self.0)
    }
}

/// A single posting entry within a field's posting list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub docno: DocNo,
    /// Sorted token positions of the term in the field
    pub positions: Vec<u32>,
}

impl Posting {
    pub fn new(docno: DocNo, positions: Vec<u32>) -> Self {
        Self { docno, positions }
    }

    pub fn term_frequency(&self) -> u32 {
        self.positions.len() as u32
    }
}
