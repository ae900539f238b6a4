//! Declarative document schemas.
//!
//! A [`Document`] is built once at schema-declaration time and is read-only
//! afterwards. Registration methods return [`BoundField`] handles that tie
//! every later query expression to the field's codec, while the document
//! itself keeps an erased description of each field for mapping compilation.

use crate::error::{Error, Result};
use crate::query::Script;
use crate::types::{
    BooleanType, DateTimeType, DateType, DoubleType, FieldType, FloatType, IntType, JoinType,
    KeywordType, LongType, TextType,
};
use crate::value::{Params, Value};
use std::fmt;

/// A codec instance attached to a concrete wire path inside a schema.
///
/// Handles are cheap to clone and immutable after construction.
#[derive(Clone)]
pub struct BoundField<FT> {
    name: String,
    path: String,
    field_type: FT,
}

impl<FT: FieldType> BoundField<FT> {
    /// Wire name of the field (the last path segment).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full dotted wire path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn field_type(&self) -> &FT {
        &self.field_type
    }
}

impl<FT> fmt::Debug for BoundField<FT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundField")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Erased description of one mapped field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MappingField {
    pub name: String,
    pub type_name: String,
    pub params: Params,
    pub sub_fields: Vec<MappingField>,
    pub properties: Option<Document>,
}

/// Erased description of one runtime (script-computed) field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RuntimeField {
    pub name: String,
    pub type_name: String,
    pub script: Script,
}

/// An ordered set of codec-bound fields describing a document shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    path: String,
    pub(crate) params: Params,
    pub(crate) fields: Vec<MappingField>,
    pub(crate) runtime: Vec<RuntimeField>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn qualify(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        }
    }

    /// Register a field with an explicit type and mapping parameters.
    pub fn field<FT: FieldType>(&mut self, name: &str, field_type: FT, params: Params) -> BoundField<FT> {
        self.fields.push(MappingField {
            name: name.to_string(),
            type_name: field_type.name(),
            params,
            sub_fields: Vec::new(),
            properties: None,
        });
        BoundField {
            name: name.to_string(),
            path: self.qualify(name),
            field_type,
        }
    }

    pub fn int(&mut self, name: &str) -> BoundField<IntType> {
        self.field(name, IntType, Params::new())
    }

    pub fn long(&mut self, name: &str) -> BoundField<LongType> {
        self.field(name, LongType, Params::new())
    }

    pub fn float(&mut self, name: &str) -> BoundField<FloatType> {
        self.field(name, FloatType, Params::new())
    }

    pub fn double(&mut self, name: &str) -> BoundField<DoubleType> {
        self.field(name, DoubleType, Params::new())
    }

    pub fn boolean(&mut self, name: &str) -> BoundField<BooleanType> {
        self.field(name, BooleanType, Params::new())
    }

    pub fn keyword(&mut self, name: &str) -> BoundField<KeywordType> {
        self.field(name, KeywordType, Params::new())
    }

    pub fn text(&mut self, name: &str) -> BoundField<TextType> {
        self.field(name, TextType, Params::new())
    }

    pub fn date(&mut self, name: &str) -> BoundField<DateType> {
        self.field(name, DateType, Params::new())
    }

    pub fn datetime(&mut self, name: &str) -> BoundField<DateTimeType> {
        self.field(name, DateTimeType, Params::new())
    }

    /// Register a join field with its parent/child relations.
    pub fn join(&mut self, name: &str, relations: &[(&str, &[&str])]) -> BoundField<JoinType> {
        let relations = Value::Object(
            relations
                .iter()
                .map(|(parent, children)| {
                    (
                        parent.to_string(),
                        Value::Array(children.iter().map(|child| Value::from(*child)).collect()),
                    )
                })
                .collect(),
        );
        self.field(name, JoinType, Params::new().with("relations", relations))
    }

    /// Register a multi-field under an already declared field.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not declared directly in this document; that
    /// is a schema-declaration error.
    pub fn sub_field<FT: FieldType>(
        &mut self,
        parent: &BoundField<impl FieldType>,
        name: &str,
        field_type: FT,
        params: Params,
    ) -> BoundField<FT> {
        let entry = self
            .fields
            .iter_mut()
            .find(|field| field.name == parent.name)
            .unwrap_or_else(|| panic!("field '{}' is not declared in this document", parent.name));
        entry.sub_fields.push(MappingField {
            name: name.to_string(),
            type_name: field_type.name(),
            params,
            sub_fields: Vec::new(),
            properties: None,
        });
        BoundField {
            name: name.to_string(),
            path: format!("{}.{name}", parent.path),
            field_type,
        }
    }

    /// Register a sub-document under an `object` field.
    ///
    /// The closure declares the sub-document's fields and returns whatever
    /// handle structure the caller wants to keep.
    pub fn object<R>(
        &mut self,
        name: &str,
        params: Params,
        build: impl FnOnce(&mut Document) -> R,
    ) -> R {
        self.structured(name, "object", params, build)
    }

    /// Register a sub-document under a `nested` field.
    pub fn nested<R>(
        &mut self,
        name: &str,
        params: Params,
        build: impl FnOnce(&mut Document) -> R,
    ) -> R {
        self.structured(name, "nested", params, build)
    }

    fn structured<R>(
        &mut self,
        name: &str,
        type_name: &str,
        params: Params,
        build: impl FnOnce(&mut Document) -> R,
    ) -> R {
        let mut child = Document {
            path: self.qualify(name),
            ..Document::default()
        };
        let handles = build(&mut child);
        self.fields.push(MappingField {
            name: name.to_string(),
            type_name: type_name.to_string(),
            params,
            sub_fields: Vec::new(),
            properties: Some(child),
        });
        handles
    }

    /// Declare a runtime field computed by a script.
    ///
    /// Runtime fields live at the top level of a mapping; declaring them in
    /// sub-documents has no effect.
    pub fn runtime<FT: FieldType>(
        &mut self,
        name: &str,
        field_type: FT,
        script: Script,
    ) -> BoundField<FT> {
        self.runtime.push(RuntimeField {
            name: name.to_string(),
            type_name: field_type.name(),
            script,
        });
        BoundField {
            name: name.to_string(),
            path: self.qualify(name),
            field_type,
        }
    }

    /// Set a document-level mapping parameter (e.g. `dynamic`).
    pub fn set_param(&mut self, name: &str, value: impl Into<Value>) {
        self.params.insert(name, value);
    }

    /// Number of declared fields, runtime fields included.
    pub fn len(&self) -> usize {
        self.fields.len() + self.runtime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.runtime.is_empty()
    }
}

/// Merge documents into a single schema.
///
/// The result is the union of fields in first-seen order. A field declared
/// in several documents must be structurally identical everywhere, otherwise
/// the merge fails with [`Error::MergeConflict`].
pub fn merge_documents(docs: &[&Document]) -> Result<Document> {
    let mut merged = Document::new();
    for doc in docs {
        for field in &doc.fields {
            match merged.fields.iter().position(|f| f.name == field.name) {
                Some(at) => {
                    if merged.fields[at] != *field {
                        return Err(Error::MergeConflict {
                            field: field.name.clone(),
                        });
                    }
                }
                None => merged.fields.push(field.clone()),
            }
        }
        for runtime in &doc.runtime {
            match merged.runtime.iter().position(|f| f.name == runtime.name) {
                Some(at) => {
                    if merged.runtime[at] != *runtime {
                        return Err(Error::MergeConflict {
                            field: runtime.name.clone(),
                        });
                    }
                }
                None => merged.runtime.push(runtime.clone()),
            }
        }
        for (name, value) in doc.params.iter() {
            match merged.params.get(name) {
                Some(existing) => {
                    if existing != value {
                        return Err(Error::MergeConflict { field: name.to_string() });
                    }
                }
                None => match value {
                    crate::value::ParamValue::Value(v) => merged.params.insert(name, v),
                    crate::value::ParamValue::FieldRef(path) => {
                        merged.params.insert_field_ref(name, path.clone())
                    }
                },
            }
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OptionalListType, TermKind};

    #[test]
    fn bound_field_paths() {
        let mut doc = Document::new();
        let status = doc.int("status");
        assert_eq!(status.name(), "status");
        assert_eq!(status.path(), "status");
        assert_eq!(status.field_type().term_kind(), TermKind::Int);

        let company = doc.object("company", Params::new(), |company| {
            let name = company.text("name");
            let opinion = company.object("opinion", Params::new(), |opinion| opinion.int("count"));
            (name, opinion)
        });
        assert_eq!(company.0.path(), "company.name");
        assert_eq!(company.1.path(), "company.opinion.count");
    }

    #[test]
    fn sub_field_paths() {
        let mut doc = Document::new();
        let name = doc.field("name", TextType, Params::new().with("analyzer", "standard"));
        let sort = doc.sub_field(
            &name,
            "sort",
            KeywordType,
            Params::new().with("normalizer", "lowercase"),
        );
        assert_eq!(sort.path(), "name.sort");
        assert_eq!(doc.fields[0].sub_fields.len(), 1);
        assert_eq!(doc.fields[0].sub_fields[0].name, "sort");
    }

    #[test]
    fn list_fields_keep_inner_type_name() {
        let mut doc = Document::new();
        let tags = doc.field("tags", OptionalListType(KeywordType), Params::new());
        assert_eq!(doc.fields[0].type_name, "keyword");
        assert_eq!(tags.path(), "tags");
    }

    #[test]
    fn merge_is_idempotent() {
        let mut doc = Document::new();
        doc.int("id");
        doc.text("text");
        doc.join("join", &[("question", &["answer"])]);

        let merged = merge_documents(&[&doc, &doc]).unwrap();
        assert_eq!(merged.fields, doc.fields);
    }

    #[test]
    fn merge_unions_fields_in_order() {
        let mut question = Document::new();
        question.join("join", &[("question", &["answer"])]);
        question.int("id");
        question.text("text");

        let mut answer = Document::new();
        answer.join("join", &[("question", &["answer"])]);
        answer.int("id");
        answer.text("text");
        answer.boolean("accepted");

        let merged = merge_documents(&[&question, &answer]).unwrap();
        let names: Vec<&str> = merged.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["join", "id", "text", "accepted"]);
    }

    #[test]
    fn merge_conflict_on_differing_types() {
        let mut left = Document::new();
        left.int("status");
        let mut right = Document::new();
        right.keyword("status");

        assert_eq!(
            merge_documents(&[&left, &right]),
            Err(Error::MergeConflict {
                field: "status".into(),
            })
        );
    }

    #[test]
    fn merge_conflict_on_differing_params() {
        let mut left = Document::new();
        left.field("name", TextType, Params::new().with("analyzer", "standard"));
        let mut right = Document::new();
        right.field("name", TextType, Params::new().with("analyzer", "ngram"));

        assert!(merge_documents(&[&left, &right]).is_err());
    }

    #[test]
    fn merge_document_params() {
        let mut left = Document::new();
        left.set_param("dynamic", "strict");
        let mut right = Document::new();
        right.set_param("dynamic", "strict");
        let merged = merge_documents(&[&left, &right]).unwrap();
        assert!(merged.params.get("dynamic").is_some());

        let mut conflicting = Document::new();
        conflicting.set_param("dynamic", "runtime");
        assert!(merge_documents(&[&left, &conflicting]).is_err());
    }
}
