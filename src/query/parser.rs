//! Elasticsearch-flavored query DSL parser
//!
//! Translates a JSON query document into a `QueryNode` tree. The dialect is a
//! small subset of Elasticsearch Query DSL:
//!
//! ```text
//! Query      := {"match": FieldSpec} | {"match_phrase": FieldSpec}
//!             | {"bool": BoolSpec}   | {"nested": NestedSpec}
//! FieldSpec  := { <fieldName>: { "query": string, "boost"?: number } }
//! BoolSpec   := { "must"?: [Query], "should"?: [Query] }
//! NestedSpec := { "path": string, "query": Query }
//! ```
//!
//! Only two inputs are errors: text that is not a JSON object, and a root
//! from which no recognized clause can be extracted. Every other shape
//! problem drops the offending clause.
//!
//! # Known limitations
//!
//! A `match` or `match_phrase` object with several field entries honors only
//! one of them. Which one is not part of the dialect; callers must not rely
//! on it.

use crate::config::{NestedPathMode, ParserOptions};
use crate::dialect::Dialect;
use crate::error::NimbusError;
use crate::query::ast::QueryNode;
use crate::query::dsl::{BoolSpec, Clause, FieldClause, NestedSpec, RawQuery};
use crate::query::nodes::{BoolQuery, MatchQuery, PhraseQuery};
use crate::query::types::normalize_boost;
use crate::Result;
use serde_json::Value;
use tracing::{debug, trace};

/// Query parser for the Elasticsearch-flavored JSON dialect
#[derive(Clone, Debug, Default)]
pub struct EsDslParser {
    options: ParserOptions,
}

impl EsDslParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Parse a JSON string into a query tree
    ///
    /// # Example
    ///
    /// ```
    /// use nimbus::query::EsDslParser;
    ///
    /// let parser = EsDslParser::new();
    /// let node = parser
    ///     .parse_str(r#"{ "match": { "title": { "query": "sony", "boost": 2.0 } } }"#)
    ///     .unwrap();
    /// assert_eq!(node.field(), Some("title"));
    /// assert_eq!(node.boost(), Some(2.0));
    /// ```
    pub fn parse_str(&self, text: &str) -> Result<QueryNode> {
        let value: Value = serde_json::from_str(text).map_err(NimbusError::malformed_json)?;
        self.parse_value(&value)
    }

    /// Parse an already decoded JSON value
    pub fn parse_value(&self, value: &Value) -> Result<QueryNode> {
        if !value.is_object() {
            return Err(NimbusError::malformed_root(value));
        }

        RawQuery::from_value(value)
            .and_then(|raw| self.extract(raw, ""))
            .ok_or_else(|| NimbusError::UnsupportedQueryFormat { raw: value.clone() })
    }

    /// Extract one clause under the given field-path prefix
    fn extract(&self, raw: RawQuery, prefix: &str) -> Option<QueryNode> {
        match Clause::from_raw(raw)? {
            Clause::Match(fc) => {
                let (field, text, boost) = self.field_parts(fc, prefix, "match");
                let mut query = MatchQuery::new(field, text);
                query.boost = boost;
                Some(query.into())
            }
            Clause::MatchPhrase(fc) => {
                let (field, text, boost) = self.field_parts(fc, prefix, "match_phrase");
                let mut query = PhraseQuery::new(field, text);
                query.boost = boost;
                Some(query.into())
            }
            Clause::Bool(spec) => Some(self.extract_bool(spec, prefix).into()),
            Clause::Nested(spec) => self.extract_nested(spec, prefix),
        }
    }

    fn field_parts(
        &self,
        fc: FieldClause,
        prefix: &str,
        kind: &str,
    ) -> (String, String, Option<f64>) {
        if !fc.ignored.is_empty() {
            debug!(
                "{} clause honors field '{}' and ignores {:?}",
                kind, fc.field, fc.ignored
            );
        }

        let field = field_path(prefix, &fc.field);
        trace!("{} clause on field '{}'", kind, field);

        let text = fc.spec.query.unwrap_or_default();
        let boost = fc.spec.boost.and_then(normalize_boost);
        (field, text, boost)
    }

    fn extract_bool(&self, spec: BoolSpec, prefix: &str) -> BoolQuery {
        let must_len = spec.must.len();
        let should_len = spec.should.len();

        let must: Vec<QueryNode> = spec
            .must
            .into_iter()
            .filter_map(|raw| self.extract(raw, prefix))
            .collect();
        let should: Vec<QueryNode> = spec
            .should
            .into_iter()
            .filter_map(|raw| self.extract(raw, prefix))
            .collect();

        let dropped = (must_len - must.len()) + (should_len - should.len());
        if dropped > 0 {
            debug!("bool clause dropped {} unrecognized sub-queries", dropped);
        }

        BoolQuery { must, should }
    }

    fn extract_nested(&self, spec: NestedSpec, prefix: &str) -> Option<QueryNode> {
        let path = spec.path.filter(|p| !p.is_empty());
        let (path, inner) = match (path, spec.query) {
            (Some(path), Some(inner)) => (path, inner),
            _ => {
                debug!("nested clause without a path or an object query");
                return None;
            }
        };

        let scoped = match self.options.nested_paths {
            NestedPathMode::Replace => path,
            NestedPathMode::Compose => field_path(prefix, &path),
        };
        trace!("nested clause scoped to '{}'", scoped);

        self.extract(*inner, &scoped)
    }
}

impl Dialect for EsDslParser {
    fn parse(&self, text: &str) -> Result<QueryNode> {
        self.parse_str(text)
    }

    fn name(&self) -> &'static str {
        "esdsl"
    }
}

/// Join a path prefix and a field name with a single dot
fn field_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
