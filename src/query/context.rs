//! Query execution context
//!
//! A `QueryContext` borrows the index for the duration of one search. It
//! resolves postings against the live-docs bitmap and computes BM25 term
//! scores from per-field statistics.
//!
//! Query text analysis and per-term IDF are computed once per search and
//! cached, since scoring visits every matched document.

use crate::index::{bm25, idf, Bm25Params, DocNo, MemoryIndex, Posting};
use crate::tokenizer::Tokenizer;
use parking_lot::RwLock;
use roaring::RoaringBitmap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Analyzed query text: terms with their positions, in order
pub type AnalyzedText = Arc<[(String, u32)]>;

/// Query execution context providing access to index data
pub struct QueryContext<'a> {
    index: &'a MemoryIndex,
    tokenizer: &'a Tokenizer,
    /// Snapshot of live docnos, taken once per search
    live_docs: RoaringBitmap,
    params: Bm25Params,
    /// Analysis cache, keyed by query text
    analyzed: RwLock<HashMap<String, AnalyzedText>>,
    /// IDF cache, keyed by field then term
    term_idf: RwLock<HashMap<String, HashMap<String, f32>>>,
}

impl<'a> QueryContext<'a> {
    pub fn new(index: &'a MemoryIndex, tokenizer: &'a Tokenizer) -> Self {
        Self {
            index,
            tokenizer,
            live_docs: index.live_docs(),
            params: Bm25Params::default(),
            analyzed: RwLock::new(HashMap::new()),
            term_idf: RwLock::new(HashMap::new()),
        }
    }

    /// Tokenize query text with the engine tokenizer, once per distinct text
    pub fn analyze(&self, text: &str) -> AnalyzedText {
        if let Some(cached) = self.analyzed.read().get(text) {
            return cached.clone();
        }

        let terms: AnalyzedText = self.tokenizer.tokenize_with_positions_ordered(text).into();
        self.analyzed
            .write()
            .insert(text.to_string(), terms.clone());
        terms
    }

    pub fn live_docs(&self) -> &RoaringBitmap {
        &self.live_docs
    }

    pub fn is_live(&self, docno: DocNo) -> bool {
        self.live_docs.contains(docno.as_u32())
    }

    /// Get total number of live documents
    pub fn total_docs(&self) -> u32 {
        self.live_docs.len() as u32
    }

    fn postings(&self, field: &str, term: &str) -> &'a [Posting] {
        self.index
            .field(field)
            .and_then(|f| f.postings(term))
            .unwrap_or(&[])
    }

    /// Live documents whose field contains the term
    pub fn postings_bitmap(&self, field: &str, term: &str) -> RoaringBitmap {
        self.postings(field, term)
            .iter()
            .map(|p| p.docno.as_u32())
            .filter(|&docno| self.live_docs.contains(docno))
            .collect()
    }

    /// Positions of a term in a live document's field
    pub fn positions(&self, field: &str, term: &str, docno: DocNo) -> Option<&'a [u32]> {
        if !self.is_live(docno) {
            return None;
        }
        let postings = self.postings(field, term);
        postings
            .binary_search_by_key(&docno, |p| p.docno)
            .ok()
            .map(|i| postings[i].positions.as_slice())
    }

    /// Get document frequency for a term (number of live docs containing it)
    pub fn doc_frequency(&self, field: &str, term: &str) -> u32 {
        self.postings(field, term)
            .iter()
            .filter(|p| self.live_docs.contains(p.docno.as_u32()))
            .count() as u32
    }

    /// IDF of a term within a field, computed on first use
    pub fn term_idf(&self, field: &str, term: &str) -> f32 {
        if let Some(&cached) = self
            .term_idf
            .read()
            .get(field)
            .and_then(|terms| terms.get(term))
        {
            return cached;
        }

        let value = idf(self.doc_frequency(field, term), self.total_docs());
        self.term_idf
            .write()
            .entry(field.to_string())
            .or_default()
            .insert(term.to_string(), value);
        value
    }

    /// BM25 contribution of one term in one document field
    pub fn term_score(&self, field: &str, term: &str, docno: DocNo) -> Option<f64> {
        let positions = self.positions(field, term, docno)?;
        let stats = self.index.field(field)?.stats();
        let doc_len = stats.doc_length(docno)?;

        let score = bm25(
            positions.len() as f32,
            self.term_idf(field, term),
            doc_len as f32,
            stats.avgdl() as f32,
            &self.params,
        );
        Some(score as f64)
    }

    /// External id of a document
    pub fn doc_id(&self, docno: DocNo) -> Option<&'a str> {
        self.index.doc_entry(docno).map(|e| e.doc_id.as_str())
    }

    /// Stored fields of a document
    pub fn stored_fields(&self, docno: DocNo) -> Option<&'a Map<String, Value>> {
        self.index.doc_entry(docno).map(|e| &e.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::test_support::TestIndex;

    #[test]
    fn test_postings_respect_deletes() {
        let mut index = TestIndex::with_titles(&["sony camera", "sony lens", "canon"]);
        index.delete("0");
        let ctx = index.context();

        assert_eq!(ctx.total_docs(), 2);
        assert_eq!(ctx.postings_bitmap("title", "sony").iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(ctx.doc_frequency("title", "sony"), 1);
        assert_eq!(ctx.positions("title", "sony", DocNo(0)), None);
        assert_eq!(ctx.positions("title", "lens", DocNo(1)), Some(&[1u32][..]));
        assert!(ctx.postings_bitmap("missing", "sony").is_empty());
    }

    #[test]
    fn test_term_score() {
        let index = TestIndex::with_titles(&["sony", "sony sony camera lens", "canon"]);
        let ctx = index.context();

        let short = ctx.term_score("title", "sony", DocNo(0)).unwrap();
        assert!(short > 0.0);
        assert!(ctx.term_score("title", "sony", DocNo(1)).is_some());
        assert_eq!(ctx.term_score("title", "sony", DocNo(2)), None);

        // The rarer term scores higher at equal field length
        let rare = ctx.term_score("title", "canon", DocNo(2)).unwrap();
        assert!(rare > short);
    }

    #[test]
    fn test_idf_is_cached_per_field_and_term() {
        let index = TestIndex::with_titles(&["sony camera", "sony lens", "canon"]);
        let ctx = index.context();

        let first = ctx.term_idf("title", "sony");
        assert_eq!(first, idf(2, 3));
        assert_eq!(ctx.term_idf("title", "sony"), first);
        assert_eq!(ctx.term_idf.read().get("title").map(|t| t.len()), Some(1));
        assert_eq!(ctx.term_idf("title", "missing"), idf(0, 3));
    }

    #[test]
    fn test_analyze_is_cached() {
        let index = TestIndex::with_titles(&["sony camera"]);
        let ctx = index.context();

        let first = ctx.analyze("Canon DSLR");
        let second = ctx.analyze("Canon DSLR");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            &first[..],
            &[("canon".to_string(), 0), ("dslr".to_string(), 1)][..]
        );
        assert_eq!(ctx.analyzed.read().len(), 1);
    }

    #[test]
    fn test_stored_fields() {
        let index = TestIndex::with_titles(&["sony camera"]);
        let ctx = index.context();

        assert_eq!(ctx.doc_id(DocNo(0)), Some("0"));
        assert_eq!(
            ctx.stored_fields(DocNo(0)).and_then(|f| f.get("title")),
            Some(&Value::String("sony camera".to_string()))
        );
        assert_eq!(ctx.doc_id(DocNo(5)), None);
    }
}
