use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::DocumentId;

/// One ranked search result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocumentId,
    pub score: f64,
    /// Stored (flattened) fields of the document
    pub fields: Map<String, Value>,
}

/// Search response with timing information
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub took_us: u64,
    pub total_hits: u64,
}
