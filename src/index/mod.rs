//! In-memory inverted index backing the engine
//!
//! The index is a single append-only segment: documents get dense docnos in
//! insertion order, each field keeps term postings with positions, and
//! deletes are tombstones in a roaring bitmap.

mod memory;
mod statistics;
mod types;

pub use memory::{DocEntry, FieldIndex, MemoryIndex, POSITION_GAP};
pub use statistics::{bm25, idf, Bm25Params, FieldStatistics};
pub use types::{DocNo, Posting};
