//! Phrase query - matches an ordered run of adjacent terms
//!
//! A phrase query matches documents whose field contains every analyzed term
//! of the phrase at consecutive positions, in the order they appear in the
//! query.
//!
//! # Example
//!
//! ```rust
//! use nimbus::query::nodes::PhraseQuery;
//!
//! let query = PhraseQuery::new("description", "canon dslr").with_boost(2.0);
//! assert_eq!(query.boost, Some(2.0));
//! ```

use crate::index::DocNo;
use crate::query::context::QueryContext;
use crate::query::types::{normalize_boost, DEFAULT_BOOST};
use crate::Result;
use roaring::RoaringBitmap;
use serde::Serialize;

/// Query that matches an exact phrase of terms
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhraseQuery {
    /// Field to search in (already prefixed by any nested path)
    pub field: String,
    /// The phrase to match (will be tokenized)
    pub phrase: String,
    /// Boost factor for scoring; `None` uses the engine default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
}

/// A phrase term and its offset from the first phrase term
struct PhraseTerm<'t> {
    term: &'t str,
    offset: u32,
}

impl PhraseQuery {
    /// Create a new phrase query
    pub fn new(field: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            phrase: phrase.into(),
            boost: None,
        }
    }

    /// Set the boost factor; non-positive values leave it unset
    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = normalize_boost(boost);
        self
    }

    pub fn effective_boost(&self) -> f64 {
        self.boost.unwrap_or(DEFAULT_BOOST)
    }

    fn phrase_terms(analyzed: &[(String, u32)]) -> Vec<PhraseTerm<'_>> {
        let base = analyzed.first().map(|(_, pos)| *pos).unwrap_or(0);
        analyzed
            .iter()
            .map(|(term, pos)| PhraseTerm {
                term: term.as_str(),
                offset: pos - base,
            })
            .collect()
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Result<RoaringBitmap> {
        let analyzed = ctx.analyze(&self.phrase);
        let terms = Self::phrase_terms(&analyzed);

        if terms.is_empty() {
            return Ok(RoaringBitmap::new());
        }

        // Candidates contain every term; positions are verified afterwards
        let mut candidates: Option<RoaringBitmap> = None;
        for term in &terms {
            let bitmap = ctx.postings_bitmap(&self.field, term.term);
            candidates = Some(match candidates {
                Some(c) => c & bitmap,
                None => bitmap,
            });

            if candidates.as_ref().map(|c| c.is_empty()).unwrap_or(false) {
                return Ok(RoaringBitmap::new());
            }
        }

        let candidates = candidates.unwrap_or_default();
        if terms.len() == 1 {
            return Ok(candidates);
        }

        Ok(candidates
            .iter()
            .filter(|&docno| self.phrase_at(ctx, DocNo(docno), &terms))
            .collect())
    }

    pub fn matches(&self, ctx: &QueryContext<'_>, docno: DocNo) -> bool {
        let analyzed = ctx.analyze(&self.phrase);
        let terms = Self::phrase_terms(&analyzed);
        !terms.is_empty() && self.phrase_at(ctx, docno, &terms)
    }

    pub fn score(&self, ctx: &QueryContext<'_>, docno: DocNo) -> Option<f64> {
        let analyzed = ctx.analyze(&self.phrase);
        let terms = Self::phrase_terms(&analyzed);
        if terms.is_empty() || !self.phrase_at(ctx, docno, &terms) {
            return None;
        }

        let total: f64 = terms
            .iter()
            .filter_map(|t| ctx.term_score(&self.field, t.term, docno))
            .sum();

        if total > 0.0 {
            Some(total * self.effective_boost())
        } else {
            None
        }
    }

    fn phrase_at(&self, ctx: &QueryContext<'_>, docno: DocNo, terms: &[PhraseTerm<'_>]) -> bool {
        let mut term_positions = Vec::with_capacity(terms.len());
        for t in terms {
            match ctx.positions(&self.field, t.term, docno) {
                Some(positions) => term_positions.push((positions, t.offset)),
                None => return false,
            }
        }
        positions_form_phrase(&term_positions)
    }
}

/// Check whether sorted position lists contain the phrase
///
/// Each entry pairs a term's positions with the term's offset inside the
/// phrase. The phrase is present when some start position `p` has every term
/// at `p + offset`.
fn positions_form_phrase(term_positions: &[(&[u32], u32)]) -> bool {
    let Some(((first, first_offset), rest)) = term_positions.split_first() else {
        return true;
    };

    first.iter().any(|&pos| {
        let Some(start) = pos.checked_sub(*first_offset) else {
            return false;
        };
        rest.iter()
            .all(|(positions, offset)| positions.binary_search(&(start + offset)).is_ok())
    })
}
