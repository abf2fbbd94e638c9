//! Integration tests for dialect translation through the public API

use std::sync::Arc;

use nimbus::query::{BoolQuery, MatchQuery, PhraseQuery};
use nimbus::{
    Dialect, DialectId, DialectRegistry, Engine, EngineConfig, EsDslParser, NestedPathMode,
    NimbusError, ParserOptions, QueryNode,
};
use serde_json::json;

fn esdsl() -> Arc<dyn Dialect> {
    DialectRegistry::with_defaults(ParserOptions::default())
        .resolve(DialectId::EsDsl)
        .unwrap()
}

#[test]
fn test_match_boost_is_carried() {
    let node = esdsl()
        .parse(r#"{"match":{"title":{"query":"sony","boost":2.5}}}"#)
        .unwrap();
    assert_eq!(node.boost(), Some(2.5));

    for raw in ["0", "-1", "null", "\"2\""] {
        let text = format!(r#"{{"match":{{"title":{{"query":"sony","boost":{}}}}}}}"#, raw);
        assert_eq!(esdsl().parse(&text).unwrap().boost(), None, "boost {}", raw);
    }
}

#[test]
fn test_nested_path_prefixes_field() {
    let node = esdsl()
        .parse(r#"{"nested":{"path":"a.b","query":{"match":{"c":{"query":"x"}}}}}"#)
        .unwrap();
    assert_eq!(node, QueryNode::from(MatchQuery::new("a.b.c", "x")));
}

#[test]
fn test_nested_in_nested_path_semantics() {
    let text = r#"{
        "nested": {
            "path": "a",
            "query": {
                "bool": {
                    "must": [
                        { "nested": { "path": "b", "query": { "match": { "c": { "query": "x" } } } } },
                        { "match": { "d": { "query": "y" } } }
                    ]
                }
            }
        }
    }"#;

    // Default: the innermost path replaces the enclosing one
    let node = EsDslParser::new().parse_str(text).unwrap();
    let expected: QueryNode = BoolQuery::new()
        .must(MatchQuery::new("b.c", "x"))
        .must(MatchQuery::new("a.d", "y"))
        .into();
    assert_eq!(node, expected);

    // Opt-in: paths compose
    let node = EsDslParser::with_options(ParserOptions {
        nested_paths: NestedPathMode::Compose,
    })
    .parse_str(text)
    .unwrap();
    let expected: QueryNode = BoolQuery::new()
        .must(MatchQuery::new("a.b.c", "x"))
        .must(MatchQuery::new("a.d", "y"))
        .into();
    assert_eq!(node, expected);
}

#[test]
fn test_full_tree_translation() {
    let node = esdsl()
        .parse(
            &json!({
                "bool": {
                    "must": [
                        { "match": { "title": { "query": "sony", "boost": 2.0 } } },
                        { "wildcard": { "title": "so*" } }
                    ],
                    "should": [
                        { "match_phrase": { "description": { "query": "for travel" } } },
                        "not an object"
                    ]
                }
            })
            .to_string(),
        )
        .unwrap();

    let expected: QueryNode = BoolQuery::new()
        .must(MatchQuery::new("title", "sony").with_boost(2.0))
        .should(PhraseQuery::new("description", "for travel"))
        .into();
    assert_eq!(node, expected);
}

#[test]
fn test_translation_errors() {
    let dialect = esdsl();

    let err = dialect.parse(r#"{"range":{"year":{"gte":2020}}}"#).unwrap_err();
    match &err {
        NimbusError::UnsupportedQueryFormat { raw } => {
            assert_eq!(raw, &json!({"range":{"year":{"gte":2020}}}));
            assert_eq!(
                err.to_string(),
                r#"Unsupported query format: {"range":{"year":{"gte":2020}}}"#
            );
        }
        other => panic!("expected UnsupportedQueryFormat, got {:?}", other),
    }

    let err = dialect.parse("{\"match\": ").unwrap_err();
    match err {
        NimbusError::MalformedInput { source, .. } => assert!(source.is_some()),
        other => panic!("expected MalformedInput, got {:?}", other),
    }

    let err = dialect.parse("[]").unwrap_err();
    match err {
        NimbusError::MalformedInput { message, source } => {
            assert!(source.is_none());
            assert!(message.contains("array"));
        }
        other => panic!("expected MalformedInput, got {:?}", other),
    }
}

#[test]
fn test_engine_parse_uses_injected_dialect() {
    let parser = Arc::new(EsDslParser::with_options(ParserOptions {
        nested_paths: NestedPathMode::Compose,
    }));
    let engine = Engine::from_parts(EngineConfig::default(), parser);

    let node = engine
        .parse(r#"{"nested":{"path":"a","query":{"nested":{"path":"b","query":{"match_phrase":{"c":{"query":"x y"}}}}}}}"#)
        .unwrap();
    assert_eq!(node.field(), Some("a.b.c"));
    assert_eq!(node.query_type(), "match_phrase");
}

#[test]
fn test_config_file_selects_nested_mode() {
    let config = EngineConfig::from_json_str(r#"{ "parser": { "nested_paths": "compose" } }"#).unwrap();
    assert_eq!(config.dialect, DialectId::EsDsl);
    let engine = Engine::with_config(config).unwrap();

    let node = engine
        .parse(r#"{"nested":{"path":"a","query":{"nested":{"path":"b","query":{"match":{"c":{"query":"x"}}}}}}}"#)
        .unwrap();
    assert_eq!(node.field(), Some("a.b.c"));
}
