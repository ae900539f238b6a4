//! End-to-end tests: declare a schema, build queries, compile, deserialize.
//!
//! These cover the whole path a real caller takes, using the in-crate value
//! serializer as the backend.

use quarry_engine::{
    merge_documents, DocSource, Document, EngineVersion, Error, Expr, FieldType, IntType,
    MappingCompiler, ObjectType, Params, Script, SearchQuery, SearchQueryCompiler, SortOrder,
    TextType, Value, ValueSerializer,
};
use serde_json::json;

const ES6: EngineVersion = EngineVersion::new(6, 0, 0);
const ES7: EngineVersion = EngineVersion::new(7, 12, 0);

#[test]
fn user_search_scenario() {
    let mut doc = Document::new();
    let status = doc.int("status");
    let rank = doc.float("rank");
    let opinions_count = doc.int("opinions_count");

    let query = SearchQuery::new()
        .filter(status.eq(0))
        .filter(rank.gte(90.0))
        .filter(opinions_count.gt(5));

    let body = SearchQueryCompiler::new(ES6)
        .compile(&ValueSerializer, &query)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
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

    let mapping = MappingCompiler::new(ES6)
        .compile(&ValueSerializer, &doc)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&mapping).unwrap(),
        json!({
            "properties": {
                "status": {"type": "integer"},
                "rank": {"type": "float"},
                "opinions_count": {"type": "integer"},
            },
        })
    );
}

#[test]
fn same_models_compile_for_multiple_versions() {
    let mut doc = Document::new();
    let rank = doc.float("rank");

    let query = SearchQuery::new()
        .filter(rank.gt(0.0))
        .track_total_hits(true)
        .sort(&rank, SortOrder::Desc);

    // ES 7 accepts the query as-is.
    assert!(SearchQueryCompiler::new(ES7)
        .compile(&ValueSerializer, &query)
        .is_ok());

    // ES 6 rejects the construct it never supported, naming the minimum.
    let err = SearchQueryCompiler::new(ES6)
        .compile(&ValueSerializer, &query)
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnsupportedFeature {
            feature: "track_total_hits",
            min: EngineVersion::new(7, 0, 0),
            version: ES6,
        }
    );

    // The model itself is reusable: stripping the gated construct compiles
    // for the old version too.
    let portable = SearchQuery::new().filter(rank.gt(0.0));
    assert!(SearchQueryCompiler::new(ES6)
        .compile(&ValueSerializer, &portable)
        .is_ok());
}

#[test]
fn merged_schema_serves_queries_from_both_documents() {
    let mut question = Document::new();
    question.join("join", &[("question", &["answer"])]);
    let question_text = question.text("text");

    let mut answer = Document::new();
    answer.join("join", &[("question", &["answer"])]);
    answer.text("text");
    let accepted = answer.boolean("accepted");

    let merged = merge_documents(&[&question, &answer]).unwrap();
    assert_eq!(merged.len(), 3);

    let query = SearchQuery::new()
        .query(question_text.matches("how do ranges work"))
        .filter(accepted.eq(true));
    let body = SearchQueryCompiler::new(ES7)
        .compile(&ValueSerializer, &query)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({
            "query": {
                "bool": {
                    "must": [{"match": {"text": "how do ranges work"}}],
                    "filter": [{"term": {"accepted": true}}],
                },
            },
        })
    );
}

#[test]
fn nested_fields_query_by_full_path() {
    let mut doc = Document::new();
    let (company_name, opinion_count) = doc.object("company", Params::new(), |company| {
        let name = company.text("name");
        let count = company.object("opinion", Params::new(), |opinion| opinion.int("count"));
        (name, count)
    });

    assert_eq!(company_name.path(), "company.name");

    let query = SearchQuery::new()
        .query(company_name.matches("acme"))
        .filter(opinion_count.gte(3));
    let body = SearchQueryCompiler::new(ES7)
        .compile(&ValueSerializer, &query)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({
            "query": {
                "bool": {
                    "must": [{"match": {"company.name": "acme"}}],
                    "filter": [{"range": {"company.opinion.count": {"gte": 3}}}],
                },
            },
        })
    );
}

#[derive(Debug, Default, PartialEq)]
struct OpinionSource {
    count: i32,
}

impl DocSource for OpinionSource {
    fn to_source(&self) -> Value {
        Value::Object(vec![("count".into(), IntType.serialize(&self.count))])
    }

    fn from_source(&mut self, source: Value) -> quarry_engine::Result<()> {
        if let Some(count) = source.get("count") {
            self.count = IntType.deserialize(count.clone())?;
        }
        Ok(())
    }
}

#[test]
fn responses_deserialize_through_the_same_codecs() {
    // A document value straight out of a search hit.
    let hit = Value::Object(vec![("count".into(), Value::Int(12))]);

    let object_type = ObjectType::<OpinionSource>::new();
    let parsed = object_type
        .deserialize_with(hit, Some(&OpinionSource::default))
        .unwrap();
    assert_eq!(parsed, OpinionSource { count: 12 });

    // Term values from aggregations use the looser term path.
    use quarry_engine::BooleanType;
    assert_eq!(BooleanType.deserialize_term(Value::Int(1)).unwrap(), true);
}

#[test]
fn runtime_fields_round_out_the_mapping() {
    let mut doc = Document::new();
    let timestamp = doc.datetime("@timestamp");
    let day_of_week = doc.runtime(
        "day_of_week",
        quarry_engine::KeywordType,
        Script::new("emit(doc[params.field].value.dayOfWeekEnum.toString())")
            .field_param("field", &timestamp),
    );

    // Runtime fields are queryable like any other field.
    let query = SearchQuery::new().filter(day_of_week.eq("Monday"));
    let body = SearchQueryCompiler::new(ES7)
        .compile(&ValueSerializer, &query)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({
            "query": {
                "term": {"day_of_week": "Monday"},
            },
        })
    );

    let mapping = MappingCompiler::new(ES7)
        .compile(&ValueSerializer, &doc)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&mapping).unwrap(),
        json!({
            "properties": {
                "@timestamp": {"type": "date"},
            },
            "runtime": {
                "day_of_week": {
                    "type": "keyword",
                    "script": {
                        "source": "emit(doc[params.field].value.dayOfWeekEnum.toString())",
                        "params": {"field": "@timestamp"},
                    },
                },
            },
        })
    );
}

#[test]
fn expression_helpers_compose() {
    let mut doc = Document::new();
    let status = doc.int("status");
    let rank = doc.float("rank");

    let expr = Expr::and(vec![
        Expr::or(vec![status.eq(0), status.eq(1)]),
        Expr::not(vec![status.eq(2)]),
    ]);
    let query = SearchQuery::new().filter(expr).filter(rank.exists());
    let body = SearchQueryCompiler::new(ES7)
        .compile(&ValueSerializer, &query)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({
            "query": {
                "bool": {
                    "filter": [
                        {"bool": {"must": [
                            {"bool": {"should": [
                                {"term": {"status": 0}},
                                {"term": {"status": 1}},
                            ]}},
                            {"bool": {"must_not": [
                                {"term": {"status": 2}},
                            ]}},
                        ]}},
                        {"exists": {"field": "rank"}},
                    ],
                },
            },
        })
    );
}

#[test]
fn schema_declaration_with_explicit_field_types() {
    let mut doc = Document::new();
    let title = doc.field(
        "title",
        TextType,
        Params::new().with("analyzer", "standard"),
    );
    doc.sub_field(
        &title,
        "raw",
        quarry_engine::KeywordType,
        Params::new(),
    );

    let mapping = MappingCompiler::new(ES6)
        .compile(&ValueSerializer, &doc)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&mapping).unwrap(),
        json!({
            "properties": {
                "title": {
                    "type": "text",
                    "analyzer": "standard",
                    "fields": {
                        "raw": {"type": "keyword"},
                    },
                },
            },
        })
    );
}
