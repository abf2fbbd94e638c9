//! Field statistics for BM25 scoring
//!
//! Every indexed field keeps the token length of each live document that
//! has it, so `avgdl` is computed per field.

use std::collections::HashMap;

use super::types::DocNo;

/// BM25 parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bm25Params {
    /// Term frequency saturation parameter
    pub k1: f32,
    /// Length normalization parameter
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// Length statistics for one field
#[derive(Clone, Debug, Default)]
pub struct FieldStatistics {
    /// Live documents that have this field
    pub doc_count: u32,
    /// Sum of the field lengths of those documents
    pub total_length: u64,
    doc_lengths: HashMap<DocNo, u32>,
}

impl FieldStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the field length of a newly indexed document
    pub fn add_document(&mut self, docno: DocNo, length: u32) {
        if let Some(previous) = self.doc_lengths.insert(docno, length) {
            self.total_length -= previous as u64;
        } else {
            self.doc_count += 1;
        }
        self.total_length += length as u64;
    }

    /// Forget a deleted document
    pub fn remove_document(&mut self, docno: DocNo) {
        if let Some(length) = self.doc_lengths.remove(&docno) {
            self.doc_count -= 1;
            self.total_length -= length as u64;
        }
    }

    /// Renumber documents after a compaction; unmapped documents are dropped
    pub fn remap_documents(&mut self, remap: &[Option<DocNo>]) {
        let lengths = std::mem::take(&mut self.doc_lengths);
        self.doc_count = 0;
        self.total_length = 0;
        for (docno, length) in lengths {
            if let Some(new) = remap.get(docno.as_usize()).copied().flatten() {
                self.add_document(new, length);
            }
        }
    }

    pub fn doc_length(&self, docno: DocNo) -> Option<u32> {
        self.doc_lengths.get(&docno).copied()
    }

    /// Average field length over live documents
    pub fn avgdl(&self) -> f64 {
        if self.doc_count > 0 {
            self.total_length as f64 / self.doc_count as f64
        } else {
            0.0
        }
    }
}

/// Inverse document frequency (Robertson-Sparck-Jones, kept non-negative)
pub fn idf(df: u32, total_docs: u32) -> f32 {
    let n = total_docs as f32;
    let df = df as f32;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// BM25 score of one term occurrence
///
/// # Arguments
/// * `tf` - Term frequency in the document field
/// * `idf` - Inverse document frequency of the term
/// * `doc_len` - Length of the document field (in tokens)
/// * `avgdl` - Average field length across live documents
pub fn bm25(tf: f32, idf: f32, doc_len: f32, avgdl: f32, params: &Bm25Params) -> f32 {
    if tf <= 0.0 {
        return 0.0;
    }

    let norm = if avgdl > 0.0 {
        1.0 - params.b + params.b * (doc_len / avgdl)
    } else {
        1.0
    };

    idf * (tf * (params.k1 + 1.0)) / (tf + params.k1 * norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_statistics() {
        let mut stats = FieldStatistics::new();
        stats.add_document(DocNo(0), 2);
        stats.add_document(DocNo(1), 4);
        assert_eq!(stats.doc_count, 2);
        assert_eq!(stats.avgdl(), 3.0);
        assert_eq!(stats.doc_length(DocNo(1)), Some(4));

        stats.remove_document(DocNo(0));
        assert_eq!(stats.doc_count, 1);
        assert_eq!(stats.avgdl(), 4.0);
        assert_eq!(stats.doc_length(DocNo(0)), None);

        // Removing twice is a no-op
        stats.remove_document(DocNo(0));
        assert_eq!(stats.doc_count, 1);

        stats.remove_document(DocNo(1));
        assert_eq!(stats.avgdl(), 0.0);
    }

    #[test]
    fn test_remap_documents() {
        let mut stats = FieldStatistics::new();
        stats.add_document(DocNo(0), 2);
        stats.add_document(DocNo(2), 6);
        stats.add_document(DocNo(3), 4);

        stats.remap_documents(&[None, None, Some(DocNo(0)), Some(DocNo(1))]);
        assert_eq!(stats.doc_count, 2);
        assert_eq!(stats.total_length, 10);
        assert_eq!(stats.doc_length(DocNo(0)), Some(6));
        assert_eq!(stats.doc_length(DocNo(1)), Some(4));
        assert_eq!(stats.doc_length(DocNo(2)), None);
    }

    #[test]
    fn test_idf_prefers_rare_terms() {
        assert!(idf(1, 100) > idf(50, 100));
        assert!(idf(100, 100) > 0.0);
    }

    #[test]
    fn test_bm25_score() {
        let params = Bm25Params::default();
        let w = idf(10, 1000);

        let score = bm25(5.0, w, 100.0, 100.0, &params);
        assert!(score > 0.0);

        // Higher TF should give higher score
        assert!(bm25(5.0, w, 100.0, 100.0, &params) > bm25(1.0, w, 100.0, 100.0, &params));

        // Shorter fields score higher for the same TF
        assert!(bm25(1.0, w, 10.0, 100.0, &params) > bm25(1.0, w, 200.0, 100.0, &params));

        assert_eq!(bm25(0.0, w, 100.0, 100.0, &params), 0.0);
    }
}
