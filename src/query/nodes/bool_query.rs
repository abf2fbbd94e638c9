//! Boolean query - combines clauses with must (AND) and should (score-only) semantics

use crate::index::DocNo;
use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::Result;
use roaring::RoaringBitmap;
use serde::Serialize;

/// Boolean query combining multiple clauses
///
/// - `must`: all clauses must match. Contributes to score.
/// - `should`: never excludes a document; clauses that match add to the score.
///
/// With no `must` clauses every live document matches, so a should-only
/// query ranks the whole index instead of filtering it.
///
/// # Example
///
/// ```json
/// {
///   "bool": {
///     "must": [
///       { "match": { "title": { "query": "sony" } } }
///     ],
///     "should": [
///       { "match": { "description": { "query": "travel" } } }
///     ]
///   }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    /// Clauses that must match (AND, scoring)
    pub must: Vec<QueryNode>,
    /// Clauses that only add score
    pub should: Vec<QueryNode>,
}

impl BoolQuery {
    /// Create a new empty boolean query
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a must clause
    pub fn must(mut self, query: impl Into<QueryNode>) -> Self {
        self.must.push(query.into());
        self
    }

    /// Add a should clause
    pub fn should(mut self, query: impl Into<QueryNode>) -> Self {
        self.should.push(query.into());
        self
    }

    /// Check if this is an empty query
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty()
    }

    /// Get total number of clauses
    pub fn clause_count(&self) -> usize {
        self.must.len() + self.should.len()
    }

    pub fn execute(&self, ctx: &QueryContext<'_>) -> Result<RoaringBitmap> {
        let mut result: Option<RoaringBitmap> = None;

        for query in &self.must {
            let matches = query.execute(ctx)?;
            result = Some(match result {
                Some(r) => r & matches,
                None => matches,
            });

            // Early exit if no matches
            if result.as_ref().map(|r| r.is_empty()).unwrap_or(false) {
                return Ok(RoaringBitmap::new());
            }
        }

        // Should clauses only contribute to scoring
        Ok(result.unwrap_or_else(|| ctx.live_docs().clone()))
    }

    pub fn matches(&self, ctx: &QueryContext<'_>, docno: DocNo) -> bool {
        ctx.is_live(docno) && self.must.iter().all(|q| q.matches(ctx, docno))
    }

    pub fn score(&self, ctx: &QueryContext<'_>, docno: DocNo) -> Option<f64> {
        if !self.matches(ctx, docno) {
            return None;
        }

        let total: f64 = self
            .must
            .iter()
            .chain(self.should.iter())
            .filter_map(|q| q.score(ctx, docno))
            .sum();

        if total > 0.0 {
            Some(total)
        } else {
            None
        }
    }
}
