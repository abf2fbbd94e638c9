//! Text analysis shared by indexing and query execution

#[allow(clippy::module_inception)]
mod tokenizer;

pub use tokenizer::Tokenizer;
