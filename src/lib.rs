pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod index;
pub mod models;
pub mod query;
pub mod tokenizer;

pub use config::{EngineConfig, NestedPathMode, ParserOptions, TokenizerConfig};
pub use dialect::{Dialect, DialectId, DialectRegistry};
pub use engine::Engine;
pub use error::{NimbusError, Result};
pub use models::*;
pub use query::{EsDslParser, QueryNode};
pub use tokenizer::Tokenizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
