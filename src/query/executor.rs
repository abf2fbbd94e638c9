//! Query executor for running queries against the index
//!
//! The executor resolves the matched set of a query tree, scores each match
//! and keeps the top-k by score.

use crate::index::DocNo;
use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::QueryStats;
use crate::Result;
use roaring::RoaringBitmap;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;
use tracing::trace;

/// A matched document with its score
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredDoc {
    pub docno: DocNo,
    pub score: f64,
}

/// Query execution result
#[derive(Debug)]
pub struct QueryResult {
    /// Top-k matches, best first
    pub hits: Vec<ScoredDoc>,
    /// Total number of matching documents
    pub total_hits: u64,
    /// Execution statistics
    pub stats: QueryStats,
}

/// Query executor for running queries
pub struct QueryExecutor;

impl QueryExecutor {
    /// Execute a query and return results
    ///
    /// Hits are ordered by descending score; equal scores keep insertion
    /// order. A `top_k` of zero returns no hits but still counts matches.
    pub fn execute(query: &QueryNode, ctx: &QueryContext<'_>, top_k: usize) -> Result<QueryResult> {
        let start = Instant::now();

        let matches = query.execute(ctx)?;
        let total_hits = matches.len();
        trace!(
            "{} query matched {} of {} live documents",
            query.query_type(),
            total_hits,
            ctx.total_docs()
        );

        let hits = Self::collect_top_k(query, ctx, &matches, top_k);

        let stats = QueryStats {
            docs_matched: total_hits,
            execution_time_us: start.elapsed().as_micros() as u64,
        };

        Ok(QueryResult {
            hits,
            total_hits,
            stats,
        })
    }

    fn collect_top_k(
        query: &QueryNode,
        ctx: &QueryContext<'_>,
        matches: &RoaringBitmap,
        top_k: usize,
    ) -> Vec<ScoredDoc> {
        if matches.is_empty() || top_k == 0 {
            return Vec::new();
        }

        // Min-heap on rank: the top is the worst hit kept so far
        let mut heap: BinaryHeap<Reverse<Rank>> = BinaryHeap::with_capacity(top_k + 1);

        for docno in matches.iter() {
            let docno = DocNo(docno);
            let score = query.score(ctx, docno).unwrap_or(0.0);
            let rank = Rank {
                score: OrderedFloat(score),
                docno: Reverse(docno),
            };

            if heap.len() < top_k {
                heap.push(Reverse(rank));
            } else if let Some(Reverse(worst)) = heap.peek() {
                if rank > *worst {
                    heap.pop();
                    heap.push(Reverse(rank));
                }
            }
        }

        let mut ranked: Vec<Rank> = heap.into_iter().map(|Reverse(rank)| rank).collect();
        ranked.sort_by(|a, b| b.cmp(a));

        ranked
            .into_iter()
            .map(|rank| ScoredDoc {
                docno: rank.docno.0,
                score: rank.score.0,
            })
            .collect()
    }
}

/// Ordering key of a hit: higher score first, then lower docno
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    score: OrderedFloat,
    docno: Reverse<DocNo>,
}

/// Wrapper for f64 that implements Ord for use in BinaryHeap
#[derive(Clone, Copy, Debug, PartialEq)]
struct OrderedFloat(f64);

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
