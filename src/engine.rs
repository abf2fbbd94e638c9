//! In-memory search engine driven by a query dialect
//!
//! `Engine` owns the index and one injected dialect. Query text goes through
//! the dialect into a `QueryNode`, which is executed against a read-locked
//! snapshot of the index.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::dialect::{Dialect, DialectId, DialectRegistry};
use crate::error::{NimbusError, Result};
use crate::index::MemoryIndex;
use crate::models::{Document, DocumentId, SearchHit, SearchResponse};
use crate::query::{QueryContext, QueryExecutor, QueryNode};
use crate::tokenizer::Tokenizer;

/// Search engine over an in-memory corpus
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    dialect: Arc<dyn Dialect>,
    tokenizer: Tokenizer,
    index: RwLock<MemoryIndex>,
}

impl Engine {
    /// Create an engine for a dialect with default configuration
    pub fn new(dialect: DialectId) -> Result<Self> {
        Self::with_config(EngineConfig {
            dialect,
            ..EngineConfig::default()
        })
    }

    /// Create an engine resolving its dialect from the built-in registry
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        let registry = DialectRegistry::with_defaults(config.parser.clone());
        Self::with_registry(config, &registry)
    }

    /// Create an engine resolving its dialect from `registry`
    pub fn with_registry(config: EngineConfig, registry: &DialectRegistry) -> Result<Self> {
        config.validate()?;
        let dialect = registry.resolve(config.dialect)?;
        Ok(Self::from_parts(config, dialect))
    }

    /// Create an engine with an injected dialect
    pub fn from_parts(config: EngineConfig, dialect: Arc<dyn Dialect>) -> Self {
        let tokenizer = Tokenizer::new(&config.tokenizer);
        Self {
            config,
            dialect,
            tokenizer,
            index: RwLock::new(MemoryIndex::new()),
        }
    }

    /// Read document ids from `field` in `index_document` and corpus loading
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.config.id_field = field.into();
        self
    }

    /// Replace the query dialect
    pub fn with_dialect(mut self, dialect: Arc<dyn Dialect>) -> Self {
        self.dialect = dialect;
        self
    }

    /// Index a corpus and return the engine
    pub fn with_corpus<I, T>(self, docs: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        self.index_corpus(docs)?;
        Ok(self)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Index every document of a corpus, reading ids from the id field
    ///
    /// Stops at the first failing document; documents before it stay indexed.
    pub fn index_corpus<I, T>(&self, docs: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        let mut count = 0;
        for doc in docs {
            let source = serde_json::to_value(doc)
                .map_err(|e| NimbusError::InvalidDocument(e.to_string()))?;
            self.index_document(&source)?;
            count += 1;
        }

        info!(
            "Indexed {} documents ({} live)",
            count,
            self.len()
        );
        Ok(count)
    }

    /// Index a JSON object under an explicit id, replacing any previous
    /// document with that id
    pub fn index(&self, doc_id: impl Into<DocumentId>, source: &Value) -> Result<()> {
        let document = Document::new(doc_id, source)?;
        self.insert(document);
        Ok(())
    }

    /// Index a JSON object whose id is read from the configured id field
    pub fn index_document(&self, source: &Value) -> Result<DocumentId> {
        let document = Document::from_source(source, &self.config.id_field)?;
        let id = document.id.clone();
        self.insert(document);
        Ok(id)
    }

    fn insert(&self, document: Document) {
        let mut index = self.index.write();
        let docno = index.index_document(document, &self.tokenizer);
        debug!("Indexed document as {}", docno);
    }

    /// Delete a document; returns whether it existed
    pub fn delete(&self, doc_id: &str) -> bool {
        self.index.write().delete_document(doc_id)
    }

    /// Number of live documents
    pub fn len(&self) -> usize {
        self.index.read().live_doc_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Translate query text with the engine's dialect
    pub fn parse(&self, text: &str) -> Result<QueryNode> {
        self.dialect.parse(text)
    }

    /// Parse and run a query, returning at most `size` hits
    pub fn query(&self, text: &str, size: usize) -> Result<Vec<SearchHit>> {
        let node = self.parse(text)?;
        debug!("{} parsed a {} query", self.dialect.name(), node.query_type());
        self.search(&node, size)
    }

    /// Run a translated query, returning at most `size` hits
    pub fn search(&self, query: &QueryNode, size: usize) -> Result<Vec<SearchHit>> {
        Ok(self.execute(query, size)?.hits)
    }

    /// Run a translated query and report match count and timing
    pub fn execute(&self, query: &QueryNode, size: usize) -> Result<SearchResponse> {
        let index = self.index.read();
        let ctx = QueryContext::new(&index, &self.tokenizer);
        let result = QueryExecutor::execute(query, &ctx, size)?;

        let hits = result
            .hits
            .into_iter()
            .filter_map(|hit| {
                let entry = index.doc_entry(hit.docno)?;
                Some(SearchHit {
                    id: entry.doc_id.clone(),
                    score: hit.score,
                    fields: entry.fields.clone(),
                })
            })
            .collect();

        Ok(SearchResponse {
            hits,
            took_us: result.stats.execution_time_us,
            total_hits: result.total_hits,
        })
    }
}
