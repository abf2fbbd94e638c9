//! Concrete query node implementations
//!
//! Each variant of `QueryNode` wraps one of these types.

mod bool_query;
mod match_query;
mod phrase_query;

pub use bool_query::BoolQuery;
pub use match_query::MatchQuery;
pub use phrase_query::PhraseQuery;
