//! End-to-end compilation to real JSON documents.

use quarry_engine::{
    Document, EngineVersion, Expr, MappingCompiler, Params, Script, SearchQuery,
    SearchQueryCompiler, TextType,
};
use quarry_serde_json::JsonSerializer;
use serde_json::json;

const ES6: EngineVersion = EngineVersion::new(6, 0, 0);
const ES7: EngineVersion = EngineVersion::new(7, 12, 0);

#[test]
fn empty_query_compiles_to_empty_document() {
    let body = SearchQueryCompiler::new(ES6)
        .compile(&JsonSerializer, &SearchQuery::new())
        .unwrap();
    assert_eq!(body, json!({}));
}

#[test]
fn composed_filters() {
    let mut doc = Document::new();
    let status = doc.int("status");
    let rank = doc.float("rank");
    let opinions_count = doc.int("opinions_count");

    let query = SearchQuery::new()
        .filter(status.eq(0))
        .filter(rank.gte(90.0))
        .filter(opinions_count.gt(5));

    let body = SearchQueryCompiler::new(ES6)
        .compile(&JsonSerializer, &query)
        .unwrap();
    assert_eq!(
        body,
        json!({
            "query": {
                "bool": {
                    "filter": [
                        {"term": {"status": 0}},
                        {"range": {"rank": {"gte": 90.0}}},
                        {"range": {"opinions_count": {"gt": 5}}},
                    ],
                },
            },
        })
    );
}

#[test]
fn single_filter_is_not_wrapped() {
    let mut doc = Document::new();
    let status = doc.int("status");

    let body = SearchQueryCompiler::new(ES6)
        .compile(&JsonSerializer, &SearchQuery::new().filter(status.eq(0)))
        .unwrap();
    assert_eq!(body, json!({"query": {"term": {"status": 0}}}));
}

#[test]
fn mapping_with_sub_fields_and_objects() {
    let mut doc = Document::new();
    let name = doc.field("name", TextType, Params::new().with("analyzer", "standard"));
    doc.sub_field(
        &name,
        "sort",
        quarry_engine::KeywordType,
        Params::new().with("normalizer", "lowercase"),
    );
    doc.object("opinion", Params::new().with("enabled", false), |opinion| {
        opinion.int("count");
    });

    let mapping = MappingCompiler::new(ES6)
        .compile(&JsonSerializer, &doc)
        .unwrap();
    assert_eq!(
        mapping,
        json!({
            "properties": {
                "name": {
                    "type": "text",
                    "analyzer": "standard",
                    "fields": {
                        "sort": {
                            "type": "keyword",
                            "normalizer": "lowercase",
                        },
                    },
                },
                "opinion": {
                    "type": "object",
                    "enabled": false,
                    "properties": {
                        "count": {"type": "integer"},
                    },
                },
            },
        })
    );
}

#[test]
fn runtime_mapping_for_modern_backends() {
    let mut doc = Document::new();
    let timestamp = doc.datetime("@timestamp");
    doc.runtime(
        "day_of_week",
        quarry_engine::KeywordType,
        Script::new("emit(doc[params.timestampField].value.dayOfWeek)")
            .field_param("timestampField", &timestamp),
    );

    let mapping = MappingCompiler::new(ES7)
        .compile(&JsonSerializer, &doc)
        .unwrap();
    assert_eq!(
        mapping,
        json!({
            "properties": {
                "@timestamp": {"type": "date"},
            },
            "runtime": {
                "day_of_week": {
                    "type": "keyword",
                    "script": {
                        "source": "emit(doc[params.timestampField].value.dayOfWeek)",
                        "params": {"timestampField": "@timestamp"},
                    },
                },
            },
        })
    );

    assert!(MappingCompiler::new(ES6)
        .compile(&JsonSerializer, &doc)
        .is_err());
}

#[test]
fn boolean_composition_keeps_clause_order() {
    let mut doc = Document::new();
    let status = doc.int("status");
    let title = doc.text("title");

    let query = SearchQuery::new().query(Expr::Bool {
        must: vec![title.matches("rust")],
        filter: vec![status.eq(0)],
        should: Vec::new(),
        must_not: vec![status.eq(2)],
    });

    let body = SearchQueryCompiler::new(ES7)
        .compile(&JsonSerializer, &query)
        .unwrap();
    assert_eq!(
        body,
        json!({
            "query": {
                "bool": {
                    "must": [{"match": {"title": "rust"}}],
                    "filter": [{"term": {"status": 0}}],
                    "must_not": [{"term": {"status": 2}}],
                },
            },
        })
    );
}
