//! Error types for the engine.

use crate::value::Value;
use crate::version::EngineVersion;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Cause of a numeric parse failure, preserved from the standard library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberParseError {
    #[error(transparent)]
    Int(#[from] ParseIntError),
    #[error(transparent)]
    Float(#[from] ParseFloatError),
}

/// All possible errors from the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A string literal could not be parsed into the target kind.
    #[error("cannot parse {value} as {target}")]
    InvalidFormat {
        value: Value,
        target: &'static str,
        #[source]
        cause: Option<NumberParseError>,
    },

    /// A numeric value does not fit the target type's domain.
    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: Value, target: &'static str },

    /// The wire value's shape does not match what the codec expects.
    #[error("expected {expected}, got {value}")]
    TypeMismatch { value: Value, expected: &'static str },

    /// A wire value has no corresponding domain variant.
    #[error("no {target} variant matches {value}")]
    UnknownVariant { value: Value, target: &'static str },

    /// A null appeared where a required list element was expected.
    #[error("null is not allowed in a required list")]
    NullElement,

    /// An object-like codec was asked to deserialize without a factory.
    #[error("a source factory is required to deserialize {target} values")]
    MissingSourceFactory { target: &'static str },

    /// Two documents disagree on a field's definition during merge.
    #[error("conflicting definitions for field '{field}'")]
    MergeConflict { field: String },

    /// A construct is not representable in the target backend version.
    #[error("{feature} requires version {min} or later, target version is {version}")]
    UnsupportedFeature {
        feature: &'static str,
        min: EngineVersion,
        version: EngineVersion,
    },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn error_display() {
        let err = Error::OutOfRange {
            value: Value::Int(1 << 40),
            target: "integer",
        };
        assert_eq!(
            err.to_string(),
            "value 1099511627776 is out of range for integer"
        );

        let err = Error::MergeConflict {
            field: "status".into(),
        };
        assert_eq!(err.to_string(), "conflicting definitions for field 'status'");

        let err = Error::UnsupportedFeature {
            feature: "runtime fields",
            min: EngineVersion::new(7, 11, 0),
            version: EngineVersion::new(6, 0, 0),
        };
        assert_eq!(
            err.to_string(),
            "runtime fields requires version 7.11.0 or later, target version is 6.0.0"
        );
    }

    #[test]
    fn format_error_preserves_cause() {
        let cause: NumberParseError = "one".parse::<i32>().unwrap_err().into();
        let err = Error::InvalidFormat {
            value: Value::Str("one".into()),
            target: "integer",
            cause: Some(cause),
        };
        assert!(err.source().is_some());
    }
}
