//! Query node tree produced by dialect translation
//!
//! `QueryNode` is a closed sum type: every translated query is a match, a
//! phrase match or a boolean composition of further nodes. Nested clauses in
//! the input rewrite field paths during translation and leave no node of
//! their own.

use crate::index::DocNo;
use crate::Result;
use roaring::RoaringBitmap;
use serde::Serialize;

use super::context::QueryContext;
use super::nodes::{BoolQuery, MatchQuery, PhraseQuery};

/// A translated query, ready for execution
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryNode {
    /// Bag-of-terms match on one field
    Match(MatchQuery),
    /// Ordered, adjacent terms on one field
    MatchPhrase(PhraseQuery),
    /// Conjunctive `must` plus score-only `should`
    Bool(BoolQuery),
}

impl QueryNode {
    /// Execute the query and return matching live document numbers
    pub fn execute(&self, ctx: &QueryContext<'_>) -> Result<RoaringBitmap> {
        match self {
            QueryNode::Match(q) => q.execute(ctx),
            QueryNode::MatchPhrase(q) => q.execute(ctx),
            QueryNode::Bool(q) => q.execute(ctx),
        }
    }

    /// Whether a single document satisfies this query
    pub fn matches(&self, ctx: &QueryContext<'_>, docno: DocNo) -> bool {
        match self {
            QueryNode::Match(q) => q.matches(ctx, docno),
            QueryNode::MatchPhrase(q) => q.matches(ctx, docno),
            QueryNode::Bool(q) => q.matches(ctx, docno),
        }
    }

    /// Score contribution for a document, `None` when it does not match
    pub fn score(&self, ctx: &QueryContext<'_>, docno: DocNo) -> Option<f64> {
        match self {
            QueryNode::Match(q) => q.score(ctx, docno),
            QueryNode::MatchPhrase(q) => q.score(ctx, docno),
            QueryNode::Bool(q) => q.score(ctx, docno),
        }
    }

    /// Get the query type name for debugging and logging
    pub fn query_type(&self) -> &'static str {
        match self {
            QueryNode::Match(_) => "match",
            QueryNode::MatchPhrase(_) => "match_phrase",
            QueryNode::Bool(_) => "bool",
        }
    }

    /// Explicit boost, if one was set
    pub fn boost(&self) -> Option<f64> {
        match self {
            QueryNode::Match(q) => q.boost,
            QueryNode::MatchPhrase(q) => q.boost,
            QueryNode::Bool(_) => None,
        }
    }

    /// Target field of a leaf query
    pub fn field(&self) -> Option<&str> {
        match self {
            QueryNode::Match(q) => Some(&q.field),
            QueryNode::MatchPhrase(q) => Some(&q.field),
            QueryNode::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<&BoolQuery> {
        match self {
            QueryNode::Bool(q) => Some(q),
            _ => None,
        }
    }
}

impl From<MatchQuery> for QueryNode {
    fn from(query: MatchQuery) -> Self {
        QueryNode::Match(query)
    }
}

impl From<PhraseQuery> for QueryNode {
    fn from(query: PhraseQuery) -> Self {
        QueryNode::MatchPhrase(query)
    }
}

impl From<BoolQuery> for QueryNode {
    fn from(query: BoolQuery) -> Self {
        QueryNode::Bool(query)
    }
}
