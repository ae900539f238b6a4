//! # Quarry serde_json backend
//!
//! Implements the engine's serialization abstraction on top of
//! [`serde_json::Value`], plus lossless conversions between the engine's
//! wire values and JSON values.
//!
//! ```rust
//! use quarry_engine::{EngineVersion, SearchQuery, SearchQueryCompiler};
//! use quarry_serde_json::JsonSerializer;
//!
//! let mut doc = quarry_engine::Document::new();
//! let status = doc.int("status");
//!
//! let compiler = SearchQueryCompiler::new(EngineVersion::new(7, 12, 0));
//! let body = compiler
//!     .compile(&JsonSerializer, &SearchQuery::new().filter(status.eq(0)))
//!     .unwrap();
//! assert_eq!(body, serde_json::json!({"query": {"term": {"status": 0}}}));
//! ```

use quarry_engine::{ArrayCtx, Deserializer, Error, ObjectCtx, Result, Serializer, Value};
use serde_json::{Map, Number};

/// Convert an engine wire value into a JSON value.
///
/// Non-finite floats have no JSON representation and become `null`, matching
/// serde_json's own behavior.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::Number(Number::from(*n)),
        Value::Float(x) => Number::from_f64(*x)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Object(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(name, value)| (name.clone(), to_json(value)))
                .collect(),
        ),
    }
}

/// Convert a JSON value into an engine wire value.
///
/// Integers outside the signed 64-bit domain fall back to floats.
pub fn from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(name, value)| (name.clone(), from_json(value)))
                .collect(),
        ),
    }
}

/// Write-side backend producing [`serde_json::Value`] documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

/// Object context of [`JsonSerializer`].
#[derive(Debug, Default)]
pub struct JsonObjectCtx {
    entries: Map<String, serde_json::Value>,
}

/// Array context of [`JsonSerializer`].
#[derive(Debug, Default)]
pub struct JsonArrayCtx {
    items: Vec<serde_json::Value>,
}

impl Serializer for JsonSerializer {
    type Output = serde_json::Value;
    type ObjectCtx = JsonObjectCtx;
    type ArrayCtx = JsonArrayCtx;

    fn object<F>(&self, block: F) -> Result<serde_json::Value>
    where
        F: FnOnce(&mut JsonObjectCtx) -> Result<()>,
    {
        let mut ctx = JsonObjectCtx::default();
        block(&mut ctx)?;
        Ok(serde_json::Value::Object(ctx.entries))
    }

    fn array<F>(&self, block: F) -> Result<serde_json::Value>
    where
        F: FnOnce(&mut JsonArrayCtx) -> Result<()>,
    {
        let mut ctx = JsonArrayCtx::default();
        block(&mut ctx)?;
        Ok(serde_json::Value::Array(ctx.items))
    }
}

impl ObjectCtx for JsonObjectCtx {
    type ArrayCtx = JsonArrayCtx;

    fn field(&mut self, name: &str, value: impl Into<Value>) {
        self.entries.insert(name.to_string(), to_json(&value.into()));
    }

    fn obj<F>(&mut self, name: &str, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut child = Self::default();
        block(&mut child)?;
        self.entries
            .insert(name.to_string(), serde_json::Value::Object(child.entries));
        Ok(())
    }

    fn array<F>(&mut self, name: &str, block: F) -> Result<()>
    where
        F: FnOnce(&mut JsonArrayCtx) -> Result<()>,
    {
        let mut child = JsonArrayCtx::default();
        block(&mut child)?;
        self.entries
            .insert(name.to_string(), serde_json::Value::Array(child.items));
        Ok(())
    }
}

impl ArrayCtx for JsonArrayCtx {
    type ObjectCtx = JsonObjectCtx;

    fn value(&mut self, value: impl Into<Value>) {
        self.items.push(to_json(&value.into()));
    }

    fn obj<F>(&mut self, block: F) -> Result<()>
    where
        F: FnOnce(&mut JsonObjectCtx) -> Result<()>,
    {
        let mut child = JsonObjectCtx::default();
        block(&mut child)?;
        self.items.push(serde_json::Value::Object(child.entries));
        Ok(())
    }

    fn array<F>(&mut self, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut child = Self::default();
        block(&mut child)?;
        self.items.push(serde_json::Value::Array(child.items));
        Ok(())
    }
}

/// Read-side backend parsing JSON text into engine wire values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeserializer;

impl Deserializer for JsonDeserializer {
    fn from_str(&self, data: &str) -> Result<Value> {
        match serde_json::from_str::<serde_json::Value>(data) {
            Ok(json) => Ok(from_json(&json)),
            Err(_) => Err(Error::InvalidFormat {
                value: Value::Str(data.to_string()),
                target: "JSON document",
                cause: None,
            }),
        }
    }
}
