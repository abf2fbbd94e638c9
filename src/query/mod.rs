//! Query dialect translation and execution
//!
//! This module turns query text into a `QueryNode` tree and runs that tree
//! against the in-memory index. Supported clauses:
//! - Match queries (bag-of-terms full-text search)
//! - Phrase queries (ordered, adjacent terms)
//! - Boolean queries (`must` intersects, `should` adds score)
//! - Nested clauses (rewrite field paths, leave no node of their own)
//!
//! # Example
//!
//! ```json
//! {
//!   "nested": {
//!     "path": "user",
//!     "query": {
//!       "bool": {
//!         "must": [
//!           { "match": { "address.city": { "query": "paris" } } }
//!         ],
//!         "should": [
//!           { "match_phrase": { "bio": { "query": "rust developer", "boost": 2.0 } } }
//!         ]
//!       }
//!     }
//!   }
//! }
//! ```

pub mod ast;
pub mod context;
pub mod dsl;
pub mod executor;
pub mod nodes;
pub mod parser;
pub mod types;

pub use ast::QueryNode;
pub use context::QueryContext;
pub use executor::{QueryExecutor, QueryResult, ScoredDoc};
pub use nodes::{BoolQuery, MatchQuery, PhraseQuery};
pub use parser::EsDslParser;
pub use types::*;
