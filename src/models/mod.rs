pub mod document;
pub mod search;

pub use document::{field_texts, flatten_document, Document, DocumentId};
pub use search::{SearchHit, SearchResponse};
