//! In-memory inverted index
//!
//! Postings are kept per field, each list sorted by docno. Deletes and
//! replacements tombstone the old docno; its postings stay in place and
//! are filtered out through the live-docs bitmap. Once tombstones reach
//! `COMPACT_MIN_TOMBSTONES` and outnumber live documents, the index is
//! compacted: live documents are renumbered in their original order and
//! dead postings are dropped.

use roaring::RoaringBitmap;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::statistics::FieldStatistics;
use super::types::{DocNo, Posting};
use crate::models::{field_texts, Document, DocumentId};
use crate::tokenizer::Tokenizer;
use tracing::debug;

/// Positions skipped between consecutive values of an array field, so a
/// phrase never spans two values
pub const POSITION_GAP: u32 = 100;

/// Minimum number of tombstones before a compaction is considered
pub const COMPACT_MIN_TOMBSTONES: u64 = 64;

/// Inverted index of one field
#[derive(Debug, Default)]
pub struct FieldIndex {
    terms: HashMap<String, Vec<Posting>>,
    stats: FieldStatistics,
}

impl FieldIndex {
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.terms.get(term).map(Vec::as_slice)
    }

    pub fn stats(&self) -> &FieldStatistics {
        &self.stats
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}

/// Stored form of an indexed document
#[derive(Clone, Debug)]
pub struct DocEntry {
    pub doc_id: DocumentId,
    pub fields: Map<String, Value>,
}

/// Single-segment, append-only index with tombstones
#[derive(Debug, Default)]
pub struct MemoryIndex {
    fields: HashMap<String, FieldIndex>,
    /// DocNo to stored document
    docs: Vec<DocEntry>,
    /// Tombstoned docnos
    deleted: RoaringBitmap,
    /// Document ID to live DocNo lookup
    doc_id_to_docno: HashMap<DocumentId, DocNo>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document, replacing any live document with the same id
    ///
    /// Returns the assigned DocNo.
    pub fn index_document(&mut self, document: Document, tokenizer: &Tokenizer) -> DocNo {
        self.delete_document(&document.id);

        let docno = DocNo::new(self.docs.len() as u32);

        for (field, value) in &document.fields {
            let mut term_positions: HashMap<String, Vec<u32>> = HashMap::new();
            let mut next = 0u32;
            let mut length = 0u32;

            for (i, text) in field_texts(value).iter().enumerate() {
                let start = if i == 0 { 0 } else { next + POSITION_GAP };
                let (tokens, end) = tokenizer.tokenize_with_positions_from(text, start);
                length += tokens.len() as u32;
                next = end;
                for (term, pos) in tokens {
                    term_positions.entry(term).or_default().push(pos);
                }
            }

            if term_positions.is_empty() {
                continue;
            }

            let field_index = self.fields.entry(field.clone()).or_default();
            field_index.stats.add_document(docno, length);
            for (term, positions) in term_positions {
                field_index
                    .terms
                    .entry(term)
                    .or_default()
                    .push(Posting::new(docno, positions));
            }
        }

        self.doc_id_to_docno.insert(document.id.clone(), docno);
        self.docs.push(DocEntry {
            doc_id: document.id,
            fields: document.fields,
        });

        docno
    }

    /// Tombstone a document by id; returns whether a live document was removed
    pub fn delete_document(&mut self, doc_id: &str) -> bool {
        let Some(docno) = self.doc_id_to_docno.remove(doc_id) else {
            return false;
        };

        self.deleted.insert(docno.as_u32());
        if let Some(entry) = self.docs.get(docno.as_usize()) {
            for field in entry.fields.keys() {
                if let Some(field_index) = self.fields.get_mut(field) {
                    field_index.stats.remove_document(docno);
                }
            }
        }

        if self.deleted.len() >= COMPACT_MIN_TOMBSTONES
            && self.deleted.len() > self.doc_id_to_docno.len() as u64
        {
            self.compact();
        }
        true
    }

    /// Drop tombstoned documents and renumber live ones densely
    ///
    /// Relative docno order is preserved, so insertion-order tie breaking
    /// is unaffected.
    pub fn compact(&mut self) {
        if self.deleted.is_empty() {
            return;
        }

        let mut remap: Vec<Option<DocNo>> = vec![None; self.docs.len()];
        let mut next = 0u32;
        for (old, slot) in remap.iter_mut().enumerate() {
            if !self.deleted.contains(old as u32) {
                *slot = Some(DocNo::new(next));
                next += 1;
            }
        }

        for field_index in self.fields.values_mut() {
            field_index.terms.retain(|_, postings| {
                postings.retain_mut(|posting| match remap[posting.docno.as_usize()] {
                    Some(docno) => {
                        posting.docno = docno;
                        true
                    }
                    None => false,
                });
                !postings.is_empty()
            });
            field_index.stats.remap_documents(&remap);
        }
        self.fields.retain(|_, field_index| field_index.term_count() > 0);

        let removed = self.deleted.len();
        let docs = std::mem::take(&mut self.docs);
        self.docs = docs
            .into_iter()
            .enumerate()
            .filter(|(old, _)| remap[*old].is_some())
            .map(|(_, entry)| entry)
            .collect();
        for docno in self.doc_id_to_docno.values_mut() {
            if let Some(new) = remap[docno.as_usize()] {
                *docno = new;
            }
        }
        self.deleted.clear();

        debug!(
            "compacted index: dropped {} tombstones, {} live documents",
            removed,
            self.docs.len()
        );
    }

    pub fn contains_document(&self, doc_id: &str) -> bool {
        self.doc_id_to_docno.contains_key(doc_id)
    }

    pub fn field(&self, name: &str) -> Option<&FieldIndex> {
        self.fields.get(name)
    }

    pub fn is_deleted(&self, docno: DocNo) -> bool {
        self.deleted.contains(docno.as_u32())
    }

    /// Bitmap of every live docno
    pub fn live_docs(&self) -> RoaringBitmap {
        let mut live = RoaringBitmap::new();
        live.insert_range(0..self.docs.len() as u32);
        live -= &self.deleted;
        live
    }

    /// Number of live documents
    pub fn live_doc_count(&self) -> usize {
        self.doc_id_to_docno.len()
    }

    /// Number of docnos ever assigned, including tombstoned ones
    pub fn max_doc(&self) -> u32 {
        self.docs.len() as u32
    }

    pub fn doc_entry(&self, docno: DocNo) -> Option<&DocEntry> {
        self.docs.get(docno.as_usize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerConfig;
    use serde_json::json;

    fn doc(id: &str, source: Value) -> Document {
        Document::new(id, &source).unwrap()
    }

    #[test]
    fn test_index_document() {
        let tokenizer = Tokenizer::new(&TokenizerConfig::default());
        let mut index = MemoryIndex::new();

        let docno = index.index_document(doc("a", json!({ "title": "Hello hello world" })), &tokenizer);
        assert_eq!(docno, DocNo(0));
        assert!(index.contains_document("a"));
        assert_eq!(index.live_doc_count(), 1);

        let title = index.field("title").unwrap();
        let hello = title.postings("hello").unwrap();
        assert_eq!(hello, &[Posting::new(DocNo(0), vec![0, 1])]);
        assert_eq!(hello[0].term_frequency(), 2);
        assert_eq!(title.stats().doc_length(DocNo(0)), Some(3));
        assert_eq!(title.term_count(), 2);
    }

    #[test]
    fn test_array_values_are_separated() {
        let tokenizer = Tokenizer::new(&TokenizerConfig::default());
        let mut index = MemoryIndex::new();
        index.index_document(doc("a", json!({ "tags": ["new york", "city"] })), &tokenizer);

        let tags = index.field("tags").unwrap();
        assert_eq!(tags.postings("york").unwrap()[0].positions, vec![1]);
        assert_eq!(tags.postings("city").unwrap()[0].positions, vec![2 + POSITION_GAP]);
        assert_eq!(tags.stats().doc_length(DocNo(0)), Some(3));
    }

    #[test]
    fn test_delete_document() {
        let tokenizer = Tokenizer::new(&TokenizerConfig::default());
        let mut index = MemoryIndex::new();
        index.index_document(doc("a", json!({ "title": "hello" })), &tokenizer);
        index.index_document(doc("b", json!({ "title": "hello there" })), &tokenizer);

        assert!(index.delete_document("a"));
        assert!(!index.delete_document("a"));
        assert!(!index.contains_document("a"));
        assert!(index.is_deleted(DocNo(0)));
        assert_eq!(index.live_docs().iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(index.field("title").unwrap().stats().doc_count, 1);
    }

    #[test]
    fn test_reindex_replaces() {
        let tokenizer = Tokenizer::new(&TokenizerConfig::default());
        let mut index = MemoryIndex::new();
        index.index_document(doc("a", json!({ "title": "old" })), &tokenizer);
        let docno = index.index_document(doc("a", json!({ "title": "new" })), &tokenizer);

        assert_eq!(docno, DocNo(1));
        assert_eq!(index.live_doc_count(), 1);
        assert_eq!(index.max_doc(), 2);
        assert_eq!(index.live_docs().iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(index.doc_entry(docno).unwrap().fields.get("title"), Some(&json!("new")));
    }

    #[test]
    fn test_repeated_reindex_stays_bounded() {
        let tokenizer = Tokenizer::new(&TokenizerConfig::default());
        let mut index = MemoryIndex::new();
        index.index_document(doc("other", json!({ "title": "stable neighbour" })), &tokenizer);

        for round in 0..200 {
            let text = format!("hello version{}", round);
            index.index_document(doc("a", json!({ "title": text })), &tokenizer);
        }

        assert!(index.max_doc() as u64 <= COMPACT_MIN_TOMBSTONES + 1);
        assert_eq!(index.live_doc_count(), 2);

        let title = index.field("title").unwrap();
        assert!(title.postings("hello").unwrap().len() as u64 <= COMPACT_MIN_TOMBSTONES + 1);
        assert!(title.postings("version0").is_none());
        assert_eq!(title.stats().doc_count, 2);

        // The untouched document keeps its place ahead of the rewritten one
        let live: Vec<u32> = index.live_docs().iter().collect();
        let other = live[0];
        assert_eq!(index.doc_entry(DocNo(other)).unwrap().doc_id, "other");
        let latest = live[1];
        let entry = index.doc_entry(DocNo(latest)).unwrap();
        assert_eq!(entry.doc_id, "a");
        assert_eq!(entry.fields.get("title"), Some(&json!("hello version199")));
        let postings = title.postings("version199").unwrap();
        assert_eq!(postings, &[Posting::new(DocNo(latest), vec![1])]);
        assert_eq!(title.stats().doc_length(DocNo(latest)), Some(2));
    }

    #[test]
    fn test_compact_renumbers_in_order() {
        let tokenizer = Tokenizer::new(&TokenizerConfig::default());
        let mut index = MemoryIndex::new();
        for id in ["a", "b", "c", "d"] {
            index.index_document(doc(id, json!({ "title": format!("shared {}", id) })), &tokenizer);
        }
        index.delete_document("a");
        index.delete_document("c");

        index.compact();

        assert_eq!(index.max_doc(), 2);
        assert!(index.live_docs().iter().eq([0, 1]));
        assert_eq!(index.doc_entry(DocNo(0)).unwrap().doc_id, "b");
        assert_eq!(index.doc_entry(DocNo(1)).unwrap().doc_id, "d");
        assert!(!index.is_deleted(DocNo(0)));

        let title = index.field("title").unwrap();
        let docnos: Vec<DocNo> = title.postings("shared").unwrap().iter().map(|p| p.docno).collect();
        assert_eq!(docnos, vec![DocNo(0), DocNo(1)]);
        assert!(title.postings("c").is_none());
        assert_eq!(title.stats().doc_length(DocNo(1)), Some(2));

        let docno = index.index_document(doc("e", json!({ "title": "shared e" })), &tokenizer);
        assert_eq!(docno, DocNo(2));
        assert!(index.delete_document("d"));
        assert!(index.is_deleted(DocNo(1)));
    }
}
