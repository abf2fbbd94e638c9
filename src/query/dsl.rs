//! Typed view of raw query documents
//!
//! Each JSON clause object is lifted into a `RawQuery` whose recognized keys
//! are explicit optional fields. A key holding a value of the wrong shape
//! decodes to `None` rather than failing, so every lenient "skip this" case
//! in the dialect is a visible `None` branch instead of a failed cast.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

/// One clause object with each recognized key lifted out
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawQuery {
    #[serde(rename = "match", default, deserialize_with = "lenient_object")]
    pub match_: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub match_phrase: Option<Map<String, Value>>,
    #[serde(rename = "bool", default, deserialize_with = "lenient_object")]
    pub bool_: Option<BoolSpec>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub nested: Option<NestedSpec>,
}

/// Body of a `bool` clause
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BoolSpec {
    #[serde(default, deserialize_with = "lenient_clauses")]
    pub must: Vec<RawQuery>,
    #[serde(default, deserialize_with = "lenient_clauses")]
    pub should: Vec<RawQuery>,
}

/// Body of a `nested` clause
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct NestedSpec {
    #[serde(default, deserialize_with = "lenient_string")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub query: Option<Box<RawQuery>>,
}

/// Per-field options of a `match` or `match_phrase` clause
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldSpec {
    pub query: Option<String>,
    pub boost: Option<f64>,
}

/// The single field entry honored from a `match`/`match_phrase` object
#[derive(Clone, Debug, PartialEq)]
pub struct FieldClause {
    pub field: String,
    pub spec: FieldSpec,
    /// Further field entries present in the object but not honored
    pub ignored: Vec<String>,
}

/// The one clause honored from a raw query object
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    Match(FieldClause),
    MatchPhrase(FieldClause),
    Bool(BoolSpec),
    Nested(NestedSpec),
}

impl RawQuery {
    /// Lift a JSON value; `None` unless it is an object
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(_) => RawQuery::deserialize(value.clone()).ok(),
            _ => None,
        }
    }
}

impl Clause {
    /// Pick the honored clause in precedence order
    /// match, match_phrase, bool, nested
    ///
    /// An empty `match`/`match_phrase` object still wins precedence and then
    /// yields no clause.
    pub fn from_raw(raw: RawQuery) -> Option<Clause> {
        if let Some(fields) = raw.match_ {
            return FieldClause::from_map(fields).map(Clause::Match);
        }
        if let Some(fields) = raw.match_phrase {
            return FieldClause::from_map(fields).map(Clause::MatchPhrase);
        }
        if let Some(spec) = raw.bool_ {
            return Some(Clause::Bool(spec));
        }
        raw.nested.map(Clause::Nested)
    }
}

impl FieldClause {
    /// Take the first field entry in map iteration order
    ///
    /// Which entry wins for multi-field objects is not part of the dialect;
    /// the rest are reported in `ignored`.
    pub fn from_map(fields: Map<String, Value>) -> Option<Self> {
        let mut entries = fields.into_iter();
        let (field, value) = entries.next()?;
        Some(FieldClause {
            field,
            spec: FieldSpec::from_value(&value),
            ignored: entries.map(|(name, _)| name).collect(),
        })
    }
}

impl FieldSpec {
    /// Read `query` and `boost`, dropping anything of the wrong type
    pub fn from_value(value: &Value) -> Self {
        FieldSpec {
            query: value
                .get("query")
                .and_then(Value::as_str)
                .map(str::to_string),
            boost: value.get("boost").and_then(Value::as_f64),
        }
    }
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => T::deserialize(value).ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_clauses<'de, D>(deserializer: D) -> Result<Vec<RawQuery>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(RawQuery::from_value).collect(),
        _ => Vec::new(),
    })
}
