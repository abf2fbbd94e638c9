//! Match query - bag-of-terms full-text search on one field

use crate::query::context::{AnalyzedText, QueryContext};
use crate::query::types::{normalize_boost, DEFAULT_BOOST};
use crate::index::DocNo;
use crate::Result;
use roaring::RoaringBitmap;
use serde::Serialize;

/// Query that performs full-text search on a field
///
/// The input text is analyzed with the engine tokenizer and a document
/// matches when its field contains any of the resulting terms.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchQuery {
    /// Field to search in (already prefixed by any nested path)
    pub field: String,
    /// Text to search for (will be analyzed)
    pub text: String,
    /// Boost factor for scoring; `None` uses the engine default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
}

impl MatchQuery {
    /// Create a new match query
    pub fn new(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
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

    /// Analyze the query text, once per search
    pub fn analyze(&self, ctx: &QueryContext<'_>) -> AnalyzedText {
        ctx.analyze(&self.text)
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Result<RoaringBitmap> {
        let terms = self.analyze(ctx);

        // Union of all term postings
        let result = terms
            .iter()
            .map(|(term, _)| ctx.postings_bitmap(&self.field, term))
            .reduce(|a, b| a | b)
            .unwrap_or_default();

        Ok(result)
    }

    pub fn matches(&self, ctx: &QueryContext<'_>, docno: DocNo) -> bool {
        self.analyze(ctx)
            .iter()
            .any(|(term, _)| ctx.positions(&self.field, term, docno).is_some())
    }

    pub fn score(&self, ctx: &QueryContext<'_>, docno: DocNo) -> Option<f64> {
        let total: f64 = self
            .analyze(ctx)
            .iter()
            .filter_map(|(term, _)| ctx.term_score(&self.field, term, docno))
            .sum();

        if total > 0.0 {
            Some(total * self.effective_boost())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::test_support::TestIndex;

    #[test]
    fn test_match_query_creation() {
        let query = MatchQuery::new("title", "sony camera");
        assert_eq!(query.field, "title");
        assert_eq!(query.text, "sony camera");
        assert_eq!(query.boost, None);
        assert_eq!(query.effective_boost(), 1.0);
    }

    #[test]
    fn test_match_query_boost() {
        assert_eq!(MatchQuery::new("title", "sony").with_boost(2.0).boost, Some(2.0));
        assert_eq!(MatchQuery::new("title", "sony").with_boost(0.0).boost, None);
        assert_eq!(MatchQuery::new("title", "sony").with_boost(-1.5).boost, None);
    }

    #[test]
    fn test_match_query_execute_is_disjunctive() {
        let index = TestIndex::with_titles(&["sony camera", "canon camera", "nikon lens"]);
        let ctx = index.context();

        let query = MatchQuery::new("title", "sony lens");
        let result: Vec<u32> = query.execute(&ctx).unwrap().iter().collect();
        assert_eq!(result, vec![0, 2]);

        let query = MatchQuery::new("title", "Camera");
        assert_eq!(query.execute(&ctx).unwrap().len(), 2);
    }

    #[test]
    fn test_match_query_other_field_is_empty() {
        let index = TestIndex::with_titles(&["sony camera"]);
        let ctx = index.context();

        let query = MatchQuery::new("description", "sony");
        assert!(query.execute(&ctx).unwrap().is_empty());
        assert!(!query.matches(&ctx, DocNo(0)));
    }

    #[test]
    fn test_match_query_empty_text_matches_nothing() {
        let index = TestIndex::with_titles(&["sony camera"]);
        let ctx = index.context();

        let query = MatchQuery::new("title", "");
        assert!(query.execute(&ctx).unwrap().is_empty());
        assert_eq!(query.score(&ctx, DocNo(0)), None);
    }

    #[test]
    fn test_match_query_boost_scales_score() {
        let index = TestIndex::with_titles(&["sony camera", "canon camera"]);
        let ctx = index.context();

        let plain = MatchQuery::new("title", "sony").score(&ctx, DocNo(0)).unwrap();
        let boosted = MatchQuery::new("title", "sony")
            .with_boost(2.0)
            .score(&ctx, DocNo(0))
            .unwrap();
        assert!((boosted - plain * 2.0).abs() < 1e-9);
        assert_eq!(MatchQuery::new("title", "sony").score(&ctx, DocNo(1)), None);
    }

    #[test]
    fn test_match_query_tiny_boost_keeps_ranking() {
        let index = TestIndex::with_titles(&["sony camera", "sony"]);
        let ctx = index.context();

        let query = MatchQuery::new("title", "sony").with_boost(1e-50);
        assert_eq!(query.boost, Some(1e-50));
        let longer = query.score(&ctx, DocNo(0)).unwrap();
        let shorter = query.score(&ctx, DocNo(1)).unwrap();
        assert!(longer > 0.0);
        assert!(shorter > longer);
    }

    #[test]
    fn test_match_query_analysis_is_shared() {
        let index = TestIndex::with_titles(&["sony camera", "sony lens", "canon"]);
        let ctx = index.context();

        let query = MatchQuery::new("title", "Sony Lens");
        for docno in 0..3 {
            query.score(&ctx, DocNo(docno));
        }
        let other = MatchQuery::new("description", "Sony Lens");
        assert!(std::sync::Arc::ptr_eq(&query.analyze(&ctx), &other.analyze(&ctx)));
    }
}
