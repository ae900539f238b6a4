//! Serialization abstraction between the compilers and concrete backends.
//!
//! The compilers never touch a concrete JSON type: they write through
//! [`Serializer`], [`ObjectCtx`] and [`ArrayCtx`]. Nested contexts are opened
//! with closures and attached to their parent only after the closure returns,
//! so every exit path, including a compilation error in the middle of a
//! document, leaves the builder fully closed and no partial document escapes.

use crate::error::Result;
use crate::value::Value;

/// Write side of a serialization backend.
pub trait Serializer {
    /// Compiled document type produced by this backend.
    type Output;
    type ObjectCtx: ObjectCtx<ArrayCtx = Self::ArrayCtx>;
    type ArrayCtx: ArrayCtx<ObjectCtx = Self::ObjectCtx>;

    /// Build a top-level object document.
    fn object<F>(&self, block: F) -> Result<Self::Output>
    where
        F: FnOnce(&mut Self::ObjectCtx) -> Result<()>;

    /// Build a top-level array document.
    fn array<F>(&self, block: F) -> Result<Self::Output>
    where
        F: FnOnce(&mut Self::ArrayCtx) -> Result<()>;
}

/// An open object context.
pub trait ObjectCtx: Sized {
    type ArrayCtx;

    /// Write a named field.
    fn field(&mut self, name: &str, value: impl Into<Value>);

    /// Open a named nested object for the duration of the block.
    fn obj<F>(&mut self, name: &str, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>;

    /// Open a named nested array for the duration of the block.
    fn array<F>(&mut self, name: &str, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self::ArrayCtx) -> Result<()>;
}

/// An open array context.
pub trait ArrayCtx: Sized {
    type ObjectCtx;

    /// Append a bare element.
    fn value(&mut self, value: impl Into<Value>);

    /// Append an object element built by the block.
    fn obj<F>(&mut self, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self::ObjectCtx) -> Result<()>;

    /// Append an array element built by the block.
    fn array<F>(&mut self, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>;
}

/// Read side of a serialization backend: parse raw text into wire values
/// that codecs can consume.
pub trait Deserializer {
    fn from_str(&self, data: &str) -> Result<Value>;
}

/// Reference backend producing [`Value`] trees.
///
/// Useful in tests and for callers that want the compiled document in the
/// engine's own representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer;

/// Object context of [`ValueSerializer`].
#[derive(Debug, Default)]
pub struct ValueObjectCtx {
    entries: Vec<(String, Value)>,
}

/// Array context of [`ValueSerializer`].
#[derive(Debug, Default)]
pub struct ValueArrayCtx {
    items: Vec<Value>,
}

impl Serializer for ValueSerializer {
    type Output = Value;
    type ObjectCtx = ValueObjectCtx;
    type ArrayCtx = ValueArrayCtx;

    fn object<F>(&self, block: F) -> Result<Value>
    where
        F: FnOnce(&mut ValueObjectCtx) -> Result<()>,
    {
        let mut ctx = ValueObjectCtx::default();
        block(&mut ctx)?;
        Ok(Value::Object(ctx.entries))
    }

    fn array<F>(&self, block: F) -> Result<Value>
    where
        F: FnOnce(&mut ValueArrayCtx) -> Result<()>,
    {
        let mut ctx = ValueArrayCtx::default();
        block(&mut ctx)?;
        Ok(Value::Array(ctx.items))
    }
}

impl ObjectCtx for ValueObjectCtx {
    type ArrayCtx = ValueArrayCtx;

    fn field(&mut self, name: &str, value: impl Into<Value>) {
        self.entries.push((name.to_string(), value.into()));
    }

    fn obj<F>(&mut self, name: &str, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut child = Self::default();
        block(&mut child)?;
        self.entries.push((name.to_string(), Value::Object(child.entries)));
        Ok(())
    }

    fn array<F>(&mut self, name: &str, block: F) -> Result<()>
    where
        F: FnOnce(&mut ValueArrayCtx) -> Result<()>,
    {
        let mut child = ValueArrayCtx::default();
        block(&mut child)?;
        self.entries.push((name.to_string(), Value::Array(child.items)));
        Ok(())
    }
}

impl ArrayCtx for ValueArrayCtx {
    type ObjectCtx = ValueObjectCtx;

    fn value(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    fn obj<F>(&mut self, block: F) -> Result<()>
    where
        F: FnOnce(&mut ValueObjectCtx) -> Result<()>,
    {
        let mut child = ValueObjectCtx::default();
        block(&mut child)?;
        self.items.push(Value::Object(child.entries));
        Ok(())
    }

    fn array<F>(&mut self, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut child = Self::default();
        block(&mut child)?;
        self.items.push(Value::Array(child.items));
        Ok(())
    }
}
