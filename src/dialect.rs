//! Query dialects and their registry
//!
//! A dialect turns query text into a `QueryNode`. The registry maps each
//! `DialectId` to the parser instance that serves it; it is built once and
//! only read afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::ParserOptions;
use crate::error::{NimbusError, Result};
use crate::query::{EsDslParser, QueryNode};

/// Identifier of a query dialect
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectId {
    /// Elasticsearch-flavored JSON query DSL
    #[default]
    EsDsl,
}

impl DialectId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectId::EsDsl => "esdsl",
        }
    }
}

impl fmt::Display for DialectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectId {
    type Err = NimbusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "esdsl" | "es" => Ok(DialectId::EsDsl),
            other => Err(NimbusError::Config(format!("unknown dialect '{}'", other))),
        }
    }
}

/// A query language translator
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Translate query text into a query tree
    fn parse(&self, text: &str) -> Result<QueryNode>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Immutable mapping from dialect id to parser
#[derive(Clone, Debug, Default)]
pub struct DialectRegistry {
    dialects: HashMap<DialectId, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in dialect
    pub fn with_defaults(options: ParserOptions) -> Self {
        let mut registry = Self::new();
        registry.register(DialectId::EsDsl, Arc::new(EsDslParser::with_options(options)));
        registry
    }

    /// Register a parser, replacing any previous one for the id
    pub fn register(&mut self, id: DialectId, dialect: Arc<dyn Dialect>) {
        self.dialects.insert(id, dialect);
    }

    pub fn resolve(&self, id: DialectId) -> Result<Arc<dyn Dialect>> {
        self.dialects
            .get(&id)
            .cloned()
            .ok_or(NimbusError::UnknownDialect(id))
    }

    pub fn ids(&self) -> Vec<DialectId> {
        self.dialects.keys().copied().collect()
    }
}
