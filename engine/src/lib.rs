//! # Quarry Engine
//!
//! Typed document schemas and version-aware query compilation for
//! Elasticsearch-compatible search backends.
//!
//! This crate lets client code declare a document schema once, build queries
//! against it through codec-typed field handles, and compile both into the
//! backend's JSON wire protocol - without ever hand-assembling JSON, and
//! without tying the schema to a single protocol version.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of sockets, requests or
//!   responses; transports live elsewhere
//! - **Version-agnostic models**: one schema and query model compiles
//!   correctly for any supported backend version
//! - **Backend-agnostic output**: compilers write through a serialization
//!   abstraction, never a concrete JSON type
//! - **Immutable after construction**: field types, documents and compilers
//!   are freely shareable across threads
//!
//! ## Core Concepts
//!
//! ### Field Types
//!
//! Every field is bound to a [`FieldType`]: a bidirectional codec between a
//! logical value and its wire representation, plus a narrower *term*
//! representation for exact-match contexts. Scalars ([`IntType`],
//! [`KeywordType`], [`DateTimeType`], ...) are zero-sized singletons;
//! [`RangeType`], [`EnumFieldType`], [`ObjectType`] and the list wrappers
//! adapt other field types.
//!
//! ### Documents
//!
//! A [`Document`] maps field names to bound codecs, with sub-fields,
//! sub-documents, join relations and runtime (script-computed) fields.
//! Documents declared separately can be combined with [`merge_documents`].
//!
//! ### Queries
//!
//! [`BoundField`] handles produce [`Expr`] leaves (`eq`, `gt`, `one_of`,
//! `matches`, ...) that already carry their value in wire form. A
//! [`SearchQuery`] composes them with boolean logic, pagination and sorting.
//!
//! ### Compilation
//!
//! [`MappingCompiler`] and [`SearchQueryCompiler`] lower documents and
//! queries for a specific [`EngineVersion`], writing through any
//! [`Serializer`] implementation.
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry_engine::{
//!     Document, EngineVersion, SearchQuery, SearchQueryCompiler, ValueSerializer,
//! };
//!
//! // 1. Declare a schema
//! let mut doc = Document::new();
//! let status = doc.int("status");
//! let rank = doc.float("rank");
//! let opinions_count = doc.int("opinions_count");
//!
//! // 2. Build a query from the bound fields
//! let query = SearchQuery::new()
//!     .filter(status.eq(0))
//!     .filter(rank.gte(90.0))
//!     .filter(opinions_count.gt(5));
//!
//! // 3. Compile for a backend version
//! let compiler = SearchQueryCompiler::new(EngineVersion::new(7, 12, 0));
//! let body = compiler.compile(&ValueSerializer, &query).unwrap();
//! assert_eq!(
//!     serde_json::to_value(&body).unwrap(),
//!     serde_json::json!({
//!         "query": {"bool": {"filter": [
//!             {"term": {"status": 0}},
//!             {"range": {"rank": {"gte": 90.0}}},
//!             {"range": {"opinions_count": {"gt": 5}}},
//!         ]}}
//!     }),
//! );
//! ```
//!
//! ## Deserialization
//!
//! Search responses come back through the same codecs: a field type's
//! `deserialize` turns a wire [`Value`] into the logical value, with the
//! term path (`deserialize_term`) available for aggregation keys and other
//! exact-match contexts.

pub mod compile;
pub mod document;
pub mod error;
pub mod query;
pub mod ser;
pub mod types;
pub mod value;
pub mod version;

// Re-export main types at crate root
pub use compile::{MappingCompiler, SearchQueryCompiler};
pub use document::{merge_documents, BoundField, Document};
pub use error::{Error, NumberParseError, Result};
pub use query::{Expr, Script, SearchQuery, SortOrder};
pub use ser::{ArrayCtx, Deserializer, ObjectCtx, Serializer, ValueSerializer};
pub use types::{
    BooleanType, DateTimeType, DateType, DocSource, DoubleRangeType, DoubleType, EnumFieldType,
    FieldType, FloatRangeType, FloatType, IntRangeType, IntType, Join, JoinType, KeywordType,
    LongRangeType, LongType, NestedType, ObjectType, OptionalListType, Range, RangeType,
    RequiredListType, SourceType, TermKind, TextType,
};
pub use value::{ParamValue, Params, Value};
pub use version::EngineVersion;
