//! Query expressions.
//!
//! Expressions form a tree built from [`BoundField`] operations. Leaf values
//! are serialized through the field codec's *term* representation at
//! construction time, so a leaf can never carry a value its field would not
//! accept.

use crate::document::BoundField;
use crate::types::{FieldType, Range};
use crate::value::{Params, Value};

/// A script with parameter bindings.
///
/// Parameters are literals or references to schema fields; field references
/// compile to the field's wire path.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub(crate) source: String,
    pub(crate) params: Params,
}

impl Script {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            params: Params::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name, value);
        self
    }

    pub fn field_param<FT: FieldType>(mut self, name: &str, field: &BoundField<FT>) -> Self {
        self.params.insert_field_ref(name, field.path());
        self
    }
}

/// A query expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Matches every document.
    MatchAll,
    /// Exact term match.
    Term { field: String, value: Value },
    /// Membership in a set of terms.
    Terms { field: String, values: Vec<Value> },
    /// Field presence.
    Exists { field: String },
    /// Full-text match.
    Match { field: String, query: String },
    /// Range comparison with up to four bounds.
    Range {
        field: String,
        gt: Option<Value>,
        gte: Option<Value>,
        lt: Option<Value>,
        lte: Option<Value>,
    },
    /// Boolean composition.
    Bool {
        must: Vec<Expr>,
        filter: Vec<Expr>,
        should: Vec<Expr>,
        must_not: Vec<Expr>,
    },
    /// Script predicate.
    Script(Script),
}

impl Expr {
    fn bool_with(
        must: Vec<Expr>,
        filter: Vec<Expr>,
        should: Vec<Expr>,
        must_not: Vec<Expr>,
    ) -> Expr {
        Expr::Bool {
            must,
            filter,
            should,
            must_not,
        }
    }

    /// Non-scoring conjunction. A single expression stays unwrapped.
    pub fn filter(mut exprs: Vec<Expr>) -> Expr {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Self::bool_with(Vec::new(), exprs, Vec::new(), Vec::new())
        }
    }

    /// Scoring conjunction. A single expression stays unwrapped.
    pub fn and(mut exprs: Vec<Expr>) -> Expr {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Self::bool_with(exprs, Vec::new(), Vec::new(), Vec::new())
        }
    }

    /// Disjunction.
    pub fn or(mut exprs: Vec<Expr>) -> Expr {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Self::bool_with(Vec::new(), Vec::new(), exprs, Vec::new())
        }
    }

    /// Negation.
    pub fn not(exprs: Vec<Expr>) -> Expr {
        Self::bool_with(Vec::new(), Vec::new(), Vec::new(), exprs)
    }
}

impl<FT: FieldType> BoundField<FT> {
    fn term_value(&self, term: &FT::Term) -> Value {
        self.field_type().serialize_term(term)
    }

    /// `field == term`
    pub fn eq(&self, term: impl Into<FT::Term>) -> Expr {
        Expr::Term {
            field: self.path().to_string(),
            value: self.term_value(&term.into()),
        }
    }

    /// `field` matches any of the given terms.
    pub fn one_of(&self, terms: impl IntoIterator<Item = FT::Term>) -> Expr {
        Expr::Terms {
            field: self.path().to_string(),
            values: terms
                .into_iter()
                .map(|term| self.term_value(&term))
                .collect(),
        }
    }

    /// `field` is present.
    pub fn exists(&self) -> Expr {
        Expr::Exists {
            field: self.path().to_string(),
        }
    }

    pub fn gt(&self, term: impl Into<FT::Term>) -> Expr {
        self.range(Range::new().gt(term.into()))
    }

    pub fn gte(&self, term: impl Into<FT::Term>) -> Expr {
        self.range(Range::new().gte(term.into()))
    }

    pub fn lt(&self, term: impl Into<FT::Term>) -> Expr {
        self.range(Range::new().lt(term.into()))
    }

    pub fn lte(&self, term: impl Into<FT::Term>) -> Expr {
        self.range(Range::new().lte(term.into()))
    }

    /// Range comparison over the field's term representation.
    pub fn range(&self, range: Range<FT::Term>) -> Expr {
        Expr::Range {
            field: self.path().to_string(),
            gt: range.gt.as_ref().map(|term| self.term_value(term)),
            gte: range.gte.as_ref().map(|term| self.term_value(term)),
            lt: range.lt.as_ref().map(|term| self.term_value(term)),
            lte: range.lte.as_ref().map(|term| self.term_value(term)),
        }
    }
}

impl<FT: FieldType<Term = String>> BoundField<FT> {
    /// Full-text match against the field.
    pub fn matches(&self, query: impl Into<String>) -> Expr {
        Expr::Match {
            field: self.path().to_string(),
            query: query.into(),
        }
    }
}

/// Sort direction for a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Sort {
    pub field: String,
    pub order: SortOrder,
}

/// A single-use search request model.
///
/// Build per query, compile once, discard.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchQuery {
    pub(crate) query: Option<Expr>,
    pub(crate) filters: Vec<Expr>,
    pub(crate) sorts: Vec<Sort>,
    pub(crate) size: Option<u64>,
    pub(crate) from: Option<u64>,
    pub(crate) track_total_hits: Option<bool>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scoring query.
    pub fn query(mut self, expr: Expr) -> Self {
        self.query = Some(expr);
        self
    }

    /// Add a non-scoring filter. Filters compose into a `bool.filter`
    /// conjunction in insertion order.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filters.push(expr);
        self
    }

    pub fn sort<FT: FieldType>(mut self, field: &BoundField<FT>, order: SortOrder) -> Self {
        self.sorts.push(Sort {
            field: field.path().to_string(),
            order,
        });
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    /// Ask the backend for an exact total hit count.
    pub fn track_total_hits(mut self, track: bool) -> Self {
        self.track_total_hits = Some(track);
        self
    }
}
