//! Compilation of schemas and queries into wire documents.
//!
//! Both compilers are pure recursive descent over immutable models and write
//! exclusively through the serialization abstraction, parameterized by the
//! target backend version. There is no partial success: a compile call
//! either produces the whole document or fails.

use crate::document::{Document, MappingField, RuntimeField};
use crate::error::{Error, Result};
use crate::query::{Expr, Script, SearchQuery};
use crate::ser::{ArrayCtx, ObjectCtx, Serializer};
use crate::value::{ParamValue, Params};
use crate::version::{EngineVersion, Features};

fn write_params<O: ObjectCtx>(ctx: &mut O, params: &Params) {
    for (name, value) in params.iter() {
        match value {
            ParamValue::Value(value) => ctx.field(name, value),
            ParamValue::FieldRef(path) => ctx.field(name, path.as_str()),
        }
    }
}

fn write_script<O: ObjectCtx>(ctx: &mut O, script: &Script) -> Result<()> {
    ctx.obj("script", |script_ctx| {
        script_ctx.field("source", script.source.as_str());
        if !script.params.is_empty() {
            script_ctx.obj("params", |params_ctx| {
                write_params(params_ctx, &script.params);
                Ok(())
            })?;
        }
        Ok(())
    })
}

/// Compiles a [`Document`] into a mapping document for a backend version.
#[derive(Debug, Clone, Copy)]
pub struct MappingCompiler {
    version: EngineVersion,
    features: Features,
}

impl MappingCompiler {
    pub fn new(version: EngineVersion) -> Self {
        Self {
            version,
            features: Features::for_version(version),
        }
    }

    pub fn compile<S: Serializer>(&self, serializer: &S, doc: &Document) -> Result<S::Output> {
        tracing::debug!(version = %self.version, fields = doc.len(), "compiling mapping");
        serializer.object(|ctx| self.visit_document(ctx, doc))
    }

    fn visit_document<O, A>(&self, ctx: &mut O, doc: &Document) -> Result<()>
    where
        O: ObjectCtx<ArrayCtx = A>,
        A: ArrayCtx<ObjectCtx = O>,
    {
        write_params(ctx, &doc.params);
        ctx.obj("properties", |properties_ctx| {
            for field in &doc.fields {
                self.visit_field(properties_ctx, field)?;
            }
            Ok(())
        })?;
        if !doc.runtime.is_empty() {
            if !self.features.supports_runtime_fields {
                return Err(Error::UnsupportedFeature {
                    feature: "runtime fields",
                    min: Features::RUNTIME_FIELDS_SINCE,
                    version: self.version,
                });
            }
            ctx.obj("runtime", |runtime_ctx| {
                for field in &doc.runtime {
                    self.visit_runtime_field(runtime_ctx, field)?;
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    fn visit_field<O, A>(&self, ctx: &mut O, field: &MappingField) -> Result<()>
    where
        O: ObjectCtx<ArrayCtx = A>,
        A: ArrayCtx<ObjectCtx = O>,
    {
        ctx.obj(&field.name, |field_ctx| {
            field_ctx.field("type", field.type_name.as_str());
            write_params(field_ctx, &field.params);
            if !field.sub_fields.is_empty() {
                field_ctx.obj("fields", |sub_ctx| {
                    for sub_field in &field.sub_fields {
                        self.visit_field(sub_ctx, sub_field)?;
                    }
                    Ok(())
                })?;
            }
            if let Some(properties) = &field.properties {
                write_params(field_ctx, &properties.params);
                field_ctx.obj("properties", |properties_ctx| {
                    for child in &properties.fields {
                        self.visit_field(properties_ctx, child)?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })
    }

    fn visit_runtime_field<O, A>(&self, ctx: &mut O, field: &RuntimeField) -> Result<()>
    where
        O: ObjectCtx<ArrayCtx = A>,
        A: ArrayCtx<ObjectCtx = O>,
    {
        ctx.obj(&field.name, |field_ctx| {
            field_ctx.field("type", field.type_name.as_str());
            write_script(field_ctx, &field.script)
        })
    }
}

/// Compiles a [`SearchQuery`] into a query document for a backend version.
#[derive(Debug, Clone, Copy)]
pub struct SearchQueryCompiler {
    version: EngineVersion,
    features: Features,
}

impl SearchQueryCompiler {
    pub fn new(version: EngineVersion) -> Self {
        Self {
            version,
            features: Features::for_version(version),
        }
    }

    pub fn compile<S: Serializer>(&self, serializer: &S, query: &SearchQuery) -> Result<S::Output> {
        tracing::debug!(version = %self.version, filters = query.filters.len(), "compiling search query");
        serializer.object(|ctx| {
            if let Some(expr) = Self::effective_query(query) {
                ctx.obj("query", |query_ctx| self.visit_expr(query_ctx, &expr))?;
            }
            if let Some(size) = query.size {
                ctx.field("size", size as i64);
            }
            if let Some(from) = query.from {
                ctx.field("from", from as i64);
            }
            if let Some(track) = query.track_total_hits {
                if !self.features.supports_track_total_hits {
                    return Err(Error::UnsupportedFeature {
                        feature: "track_total_hits",
                        min: Features::TRACK_TOTAL_HITS_SINCE,
                        version: self.version,
                    });
                }
                ctx.field("track_total_hits", track);
            }
            if !query.sorts.is_empty() {
                ctx.array("sort", |sort_ctx| {
                    for sort in &query.sorts {
                        sort_ctx.obj(|entry_ctx| {
                            entry_ctx.obj(&sort.field, |field_ctx| {
                                field_ctx.field("order", sort.order.as_str());
                                Ok(())
                            })
                        })?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })
    }

    /// Compose the base query and filters into a single expression.
    ///
    /// A lone filter is emitted unwrapped instead of inside a redundant
    /// boolean, so output stays structurally minimal.
    fn effective_query(query: &SearchQuery) -> Option<Expr> {
        match (&query.query, query.filters.as_slice()) {
            (None, []) => None,
            (Some(expr), []) => Some(expr.clone()),
            (None, [single]) => Some(single.clone()),
            (base, filters) => Some(Expr::Bool {
                must: base.iter().cloned().collect(),
                filter: filters.to_vec(),
                should: Vec::new(),
                must_not: Vec::new(),
            }),
        }
    }

    fn visit_expr<O, A>(&self, ctx: &mut O, expr: &Expr) -> Result<()>
    where
        O: ObjectCtx<ArrayCtx = A>,
        A: ArrayCtx<ObjectCtx = O>,
    {
        match expr {
            Expr::MatchAll => ctx.obj("match_all", |_| Ok(())),
            Expr::Term { field, value } => ctx.obj("term", |term_ctx| {
                term_ctx.field(field, value);
                Ok(())
            }),
            Expr::Terms { field, values } => ctx.obj("terms", |terms_ctx| {
                terms_ctx.array(field, |values_ctx| {
                    for value in values {
                        values_ctx.value(value);
                    }
                    Ok(())
                })
            }),
            Expr::Exists { field } => ctx.obj("exists", |exists_ctx| {
                exists_ctx.field("field", field.as_str());
                Ok(())
            }),
            Expr::Match { field, query } => ctx.obj("match", |match_ctx| {
                match_ctx.field(field, query.as_str());
                Ok(())
            }),
            Expr::Range {
                field,
                gt,
                gte,
                lt,
                lte,
            } => ctx.obj("range", |range_ctx| {
                range_ctx.obj(field, |bounds_ctx| {
                    if let Some(bound) = gt {
                        bounds_ctx.field("gt", bound);
                    }
                    if let Some(bound) = gte {
                        bounds_ctx.field("gte", bound);
                    }
                    if let Some(bound) = lt {
                        bounds_ctx.field("lt", bound);
                    }
                    if let Some(bound) = lte {
                        bounds_ctx.field("lte", bound);
                    }
                    Ok(())
                })
            }),
            Expr::Bool {
                must,
                filter,
                should,
                must_not,
            } => ctx.obj("bool", |bool_ctx| {
                self.visit_clause(bool_ctx, "must", must)?;
                self.visit_clause(bool_ctx, "filter", filter)?;
                self.visit_clause(bool_ctx, "should", should)?;
                self.visit_clause(bool_ctx, "must_not", must_not)?;
                Ok(())
            }),
            Expr::Script(script) => ctx.obj("script", |outer_ctx| write_script(outer_ctx, script)),
        }
    }

    fn visit_clause<O, A>(&self, ctx: &mut O, name: &str, exprs: &[Expr]) -> Result<()>
    where
        O: ObjectCtx<ArrayCtx = A>,
        A: ArrayCtx<ObjectCtx = O>,
    {
        if exprs.is_empty() {
            return Ok(());
        }
        ctx.array(name, |clause_ctx| {
            for expr in exprs {
                clause_ctx.obj(|expr_ctx| self.visit_expr(expr_ctx, expr))?;
            }
            Ok(())
        })
    }
}
