//! Field types: bidirectional codecs between logical values and wire values.
//!
//! Every field type converts a logical value to its wire representation and
//! back, plus a narrower *term* representation used in exact-match contexts.
//! Scalar types are zero-sized singletons; range, enum, object and list types
//! are generic wrappers carrying the type they adapt.

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;

/// Runtime tag of a field type's term representation, for dispatch in
/// contexts where the static type is erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Int,
    Long,
    Float,
    Double,
    Bool,
    Str,
    Date,
    /// Domain enums and other wrapped representations.
    Other,
    /// Object-like types have no term representation.
    None,
}

/// A bidirectional codec between logical values and wire values.
///
/// `Value` is the logical type stored in a document source; `Term` is the
/// (often identical) type used for exact-match queries. The round-trip law
/// `deserialize(serialize(v)) == v` holds for every valid `v`, except where
/// a type explicitly narrows (float precision, sub-millisecond datetimes).
pub trait FieldType {
    type Value;
    type Term;

    /// Wire type tag emitted into mappings.
    fn name(&self) -> String;

    fn term_kind(&self) -> TermKind;

    fn serialize(&self, v: &Self::Value) -> Value;

    fn deserialize(&self, v: Value) -> Result<Self::Value>;

    /// Deserialize with an explicit construction factory.
    ///
    /// Object-like types cannot manufacture a domain document on their own
    /// and fail without a factory; scalar types ignore it.
    fn deserialize_with(
        &self,
        v: Value,
        factory: Option<&dyn Fn() -> Self::Value>,
    ) -> Result<Self::Value> {
        let _ = factory;
        self.deserialize(v)
    }

    fn serialize_term(&self, t: &Self::Term) -> Value;

    fn deserialize_term(&self, v: Value) -> Result<Self::Term>;
}

/// Capability of document-like values to convert to and from wire objects.
pub trait DocSource {
    fn to_source(&self) -> Value;

    fn from_source(&mut self, source: Value) -> Result<()>;
}

/// 32-bit integer field type (`integer`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntType;

impl FieldType for IntType {
    type Value = i32;
    type Term = i32;

    fn name(&self) -> String {
        "integer".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Int
    }

    fn serialize(&self, v: &i32) -> Value {
        Value::Int(i64::from(*v))
    }

    fn deserialize(&self, v: Value) -> Result<i32> {
        match v {
            Value::Int(n) => i32::try_from(n).map_err(|_| Error::OutOfRange {
                value: Value::Int(n),
                target: "integer",
            }),
            Value::Str(s) => match s.parse::<i32>() {
                Ok(n) => Ok(n),
                Err(cause) => Err(Error::InvalidFormat {
                    value: Value::Str(s),
                    target: "integer",
                    cause: Some(cause.into()),
                }),
            },
            other => Err(Error::TypeMismatch {
                value: other,
                expected: "integer",
            }),
        }
    }

    fn serialize_term(&self, t: &i32) -> Value {
        self.serialize(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<i32> {
        self.deserialize(v)
    }
}

/// 64-bit integer field type (`long`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LongType;

impl FieldType for LongType {
    type Value = i64;
    type Term = i64;

    fn name(&self) -> String {
        "long".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Long
    }

    fn serialize(&self, v: &i64) -> Value {
        Value::Int(*v)
    }

    fn deserialize(&self, v: Value) -> Result<i64> {
        match v {
            Value::Int(n) => Ok(n),
            Value::Str(s) => match s.parse::<i64>() {
                Ok(n) => Ok(n),
                Err(cause) => Err(Error::InvalidFormat {
                    value: Value::Str(s),
                    target: "long",
                    cause: Some(cause.into()),
                }),
            },
            other => Err(Error::TypeMismatch {
                value: other,
                expected: "long",
            }),
        }
    }

    fn serialize_term(&self, t: &i64) -> Value {
        self.serialize(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<i64> {
        self.deserialize(v)
    }
}

/// 32-bit float field type (`float`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloatType;

impl FieldType for FloatType {
    type Value = f32;
    type Term = f32;

    fn name(&self) -> String {
        "float".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Float
    }

    fn serialize(&self, v: &f32) -> Value {
        Value::Float(f64::from(*v))
    }

    fn deserialize(&self, v: Value) -> Result<f32> {
        match v {
            Value::Int(n) => Ok(n as f32),
            Value::Float(x) => Ok(x as f32),
            Value::Str(s) => match s.parse::<f32>() {
                Ok(x) => Ok(x),
                Err(cause) => Err(Error::InvalidFormat {
                    value: Value::Str(s),
                    target: "float",
                    cause: Some(cause.into()),
                }),
            },
            other => Err(Error::TypeMismatch {
                value: other,
                expected: "float",
            }),
        }
    }

    fn serialize_term(&self, t: &f32) -> Value {
        self.serialize(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<f32> {
        self.deserialize(v)
    }
}

/// 64-bit float field type (`double`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DoubleType;

impl FieldType for DoubleType {
    type Value = f64;
    type Term = f64;

    fn name(&self) -> String {
        "double".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Double
    }

    fn serialize(&self, v: &f64) -> Value {
        Value::Float(*v)
    }

    fn deserialize(&self, v: Value) -> Result<f64> {
        match v {
            Value::Int(n) => Ok(n as f64),
            Value::Float(x) => Ok(x),
            Value::Str(s) => match s.parse::<f64>() {
                Ok(x) => Ok(x),
                Err(cause) => Err(Error::InvalidFormat {
                    value: Value::Str(s),
                    target: "double",
                    cause: Some(cause.into()),
                }),
            },
            other => Err(Error::TypeMismatch {
                value: other,
                expected: "double",
            }),
        }
    }

    fn serialize_term(&self, t: &f64) -> Value {
        self.serialize(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<f64> {
        self.deserialize(v)
    }
}

/// Boolean field type (`boolean`).
///
/// The term path is deliberately looser than the value path: raw index
/// fields may hold numerics, so any number maps to a boolean there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BooleanType;

impl FieldType for BooleanType {
    type Value = bool;
    type Term = bool;

    fn name(&self) -> String {
        "boolean".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Bool
    }

    fn serialize(&self, v: &bool) -> Value {
        Value::Bool(*v)
    }

    fn deserialize(&self, v: Value) -> Result<bool> {
        match v {
            Value::Bool(b) => Ok(b),
            Value::Str(s) => match s.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::InvalidFormat {
                    value: Value::Str(s),
                    target: "boolean",
                    cause: None,
                }),
            },
            other => Err(Error::TypeMismatch {
                value: other,
                expected: "boolean",
            }),
        }
    }

    fn serialize_term(&self, t: &bool) -> Value {
        self.serialize(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<bool> {
        match v {
            Value::Int(n) => Ok(n != 0),
            Value::Float(x) => Ok(x != 0.0),
            other => self.deserialize(other),
        }
    }
}

fn stringify(v: Value) -> String {
    match v {
        Value::Str(s) => s,
        other => other.to_string(),
    }
}

/// Keyword field type (`keyword`): exact-match strings.
///
/// Deserialization stringifies any wire value and never fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordType;

impl FieldType for KeywordType {
    type Value = String;
    type Term = String;

    fn name(&self) -> String {
        "keyword".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Str
    }

    fn serialize(&self, v: &String) -> Value {
        Value::Str(v.clone())
    }

    fn deserialize(&self, v: Value) -> Result<String> {
        Ok(stringify(v))
    }

    fn serialize_term(&self, t: &String) -> Value {
        self.serialize(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<String> {
        self.deserialize(v)
    }
}

/// Full-text field type (`text`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextType;

impl FieldType for TextType {
    type Value = String;
    type Term = String;

    fn name(&self) -> String {
        "text".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Str
    }

    fn serialize(&self, v: &String) -> Value {
        Value::Str(v.clone())
    }

    fn deserialize(&self, v: Value) -> Result<String> {
        Ok(stringify(v))
    }

    fn serialize_term(&self, t: &String) -> Value {
        self.serialize(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<String> {
        self.deserialize(v)
    }
}

/// Parses the progressively-optional datetime pattern
/// `YYYY[-MM[-DD[Thh[:mm[:ss[.fff]]][Z|±hh[:mm]]]]]`.
///
/// Year is mandatory; month and day default to 1, time components to 0.
/// Fractional seconds are padded or truncated to millisecond precision.
fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    fn fail(input: &str) -> Error {
        Error::InvalidFormat {
            value: Value::Str(input.to_string()),
            target: "date",
            cause: None,
        }
    }

    fn digits(part: &str, width: usize) -> Option<u32> {
        if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        part.parse().ok()
    }

    let (date_part, time_part) = match input.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (input, None),
    };

    let mut date_segments = date_part.splitn(3, '-');
    let year = date_segments
        .next()
        .and_then(|s| digits(s, 4))
        .ok_or_else(|| fail(input))?;
    let month = match date_segments.next() {
        Some(s) => digits(s, 2).ok_or_else(|| fail(input))?,
        None => 1,
    };
    let day = match date_segments.next() {
        Some(s) => digits(s, 2).ok_or_else(|| fail(input))?,
        None => 1,
    };

    let (mut hour, mut minute, mut second, mut nanos) = (0, 0, 0, 0u32);
    let mut offset_seconds = 0i32;
    if let Some(time) = time_part {
        let (clock, tz) = match time.find(['Z', '+', '-']) {
            Some(at) => {
                let (clock, tz) = time.split_at(at);
                (clock, Some(tz))
            }
            None => (time, None),
        };

        if !clock.is_empty() {
            let mut clock_segments = clock.splitn(3, ':');
            hour = clock_segments
                .next()
                .and_then(|s| digits(s, 2))
                .ok_or_else(|| fail(input))?;
            if let Some(s) = clock_segments.next() {
                minute = digits(s, 2).ok_or_else(|| fail(input))?;
            }
            if let Some(s) = clock_segments.next() {
                let (whole, frac) = match s.split_once('.') {
                    Some((whole, frac)) => (whole, Some(frac)),
                    None => (s, None),
                };
                second = digits(whole, 2).ok_or_else(|| fail(input))?;
                if let Some(frac) = frac {
                    if frac.is_empty()
                        || frac.len() > 9
                        || !frac.bytes().all(|b| b.is_ascii_digit())
                    {
                        return Err(fail(input));
                    }
                    let mut millis = String::from(frac);
                    while millis.len() < 3 {
                        millis.push('0');
                    }
                    millis.truncate(3);
                    let millis: u32 = millis.parse().map_err(|cause: std::num::ParseIntError| {
                        Error::InvalidFormat {
                            value: Value::Str(input.to_string()),
                            target: "date",
                            cause: Some(cause.into()),
                        }
                    })?;
                    nanos = millis * 1_000_000;
                }
            }
        }

        if let Some(tz) = tz {
            offset_seconds = parse_offset(tz).ok_or_else(|| fail(input))?;
        }
    }

    let naive = NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|date| date.and_hms_nano_opt(hour, minute, second, nanos))
        .ok_or_else(|| fail(input))?;
    let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| fail(input))?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| fail(input))
}

/// `Z`, `±hh`, `±hhmm` or `±hh:mm` to seconds east of UTC.
fn parse_offset(tz: &str) -> Option<i32> {
    if tz == "Z" {
        return Some(0);
    }
    let (sign, rest) = match tz.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let (hours_part, minutes_part) = match rest.len() {
        2 => (rest, None),
        4 => (&rest[..2], Some(&rest[2..])),
        5 if rest.as_bytes()[2] == b':' => (&rest[..2], Some(&rest[3..])),
        _ => return None,
    };
    if !hours_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = hours_part.parse().ok()?;
    let minutes: i32 = match minutes_part {
        Some(part) => {
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            part.parse().ok()?
        }
        None => 0,
    };
    Some(sign * (hours * 3600 + minutes * 60))
}

/// Date-and-time field type (`date`), normalized to UTC.
///
/// Accepts the progressively-optional ISO-like pattern or epoch milliseconds;
/// serializes with millisecond precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateTimeType;

impl FieldType for DateTimeType {
    type Value = DateTime<Utc>;
    type Term = DateTime<Utc>;

    fn name(&self) -> String {
        "date".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Date
    }

    fn serialize(&self, v: &DateTime<Utc>) -> Value {
        Value::Str(v.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
    }

    fn deserialize(&self, v: Value) -> Result<DateTime<Utc>> {
        match v {
            Value::Str(s) => parse_datetime(&s),
            Value::Int(millis) => {
                Utc.timestamp_millis_opt(millis)
                    .single()
                    .ok_or(Error::OutOfRange {
                        value: Value::Int(millis),
                        target: "date",
                    })
            }
            other => Err(Error::TypeMismatch {
                value: other,
                expected: "date",
            }),
        }
    }

    fn serialize_term(&self, t: &DateTime<Utc>) -> Value {
        self.serialize(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<DateTime<Utc>> {
        self.deserialize(v)
    }
}

/// Calendar-date field type (`date`).
///
/// Parses like [`DateTimeType`] and drops the time-of-day part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateType;

impl FieldType for DateType {
    type Value = NaiveDate;
    type Term = NaiveDate;

    fn name(&self) -> String {
        "date".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Date
    }

    fn serialize(&self, v: &NaiveDate) -> Value {
        Value::Str(v.format("%Y-%m-%d").to_string())
    }

    fn deserialize(&self, v: Value) -> Result<NaiveDate> {
        DateTimeType.deserialize(v).map(|dt| dt.date_naive())
    }

    fn serialize_term(&self, t: &NaiveDate) -> Value {
        self.serialize(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<NaiveDate> {
        self.deserialize(v)
    }
}

/// A parent/child join relation value.
///
/// Serializes to a bare string when parentless, to a two-key object
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    pub name: String,
    pub parent: Option<String>,
}

impl Join {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    pub fn with_parent(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
        }
    }
}

/// Join field type (`join`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinType;

impl FieldType for JoinType {
    type Value = Join;
    type Term = String;

    fn name(&self) -> String {
        "join".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Str
    }

    fn serialize(&self, v: &Join) -> Value {
        match &v.parent {
            None => Value::Str(v.name.clone()),
            Some(parent) => Value::Object(vec![
                ("name".to_string(), Value::Str(v.name.clone())),
                ("parent".to_string(), Value::Str(parent.clone())),
            ]),
        }
    }

    fn deserialize(&self, v: Value) -> Result<Join> {
        match v {
            Value::Str(name) => Ok(Join::new(name)),
            Value::Object(_) => {
                let name = v.get("name").and_then(Value::as_str).map(str::to_string);
                let parent = v.get("parent").and_then(Value::as_str).map(str::to_string);
                match name {
                    Some(name) => Ok(Join { name, parent }),
                    None => Err(Error::TypeMismatch {
                        value: v,
                        expected: "join",
                    }),
                }
            }
            other => Err(Error::TypeMismatch {
                value: other,
                expected: "join",
            }),
        }
    }

    fn serialize_term(&self, t: &String) -> Value {
        Value::Str(t.clone())
    }

    fn deserialize_term(&self, v: Value) -> Result<String> {
        KeywordType.deserialize_term(v)
    }
}

/// A range of values with up to four optional bounds.
///
/// Bound combinations are not validated; the backend interprets whatever is
/// sent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<V> {
    pub gt: Option<V>,
    pub gte: Option<V>,
    pub lt: Option<V>,
    pub lte: Option<V>,
}

impl<V> Default for Range<V> {
    fn default() -> Self {
        Self {
            gt: None,
            gte: None,
            lt: None,
            lte: None,
        }
    }
}

impl<V> Range<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gt(mut self, v: V) -> Self {
        self.gt = Some(v);
        self
    }

    pub fn gte(mut self, v: V) -> Self {
        self.gte = Some(v);
        self
    }

    pub fn lt(mut self, v: V) -> Self {
        self.lt = Some(v);
        self
    }

    pub fn lte(mut self, v: V) -> Self {
        self.lte = Some(v);
        self
    }
}

/// Range field type wrapping a scalar type (`integer_range`, `float_range`, ...).
///
/// Term operations delegate to the wrapped type.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeType<FT>(pub FT);

pub type IntRangeType = RangeType<IntType>;
pub type LongRangeType = RangeType<LongType>;
pub type FloatRangeType = RangeType<FloatType>;
pub type DoubleRangeType = RangeType<DoubleType>;

impl<FT: FieldType> FieldType for RangeType<FT> {
    type Value = Range<FT::Value>;
    type Term = FT::Term;

    fn name(&self) -> String {
        format!("{}_range", self.0.name())
    }

    fn term_kind(&self) -> TermKind {
        self.0.term_kind()
    }

    fn serialize(&self, v: &Range<FT::Value>) -> Value {
        let mut entries = Vec::new();
        if let Some(bound) = &v.gt {
            entries.push(("gt".to_string(), self.0.serialize(bound)));
        }
        if let Some(bound) = &v.gte {
            entries.push(("gte".to_string(), self.0.serialize(bound)));
        }
        if let Some(bound) = &v.lt {
            entries.push(("lt".to_string(), self.0.serialize(bound)));
        }
        if let Some(bound) = &v.lte {
            entries.push(("lte".to_string(), self.0.serialize(bound)));
        }
        Value::Object(entries)
    }

    fn deserialize(&self, v: Value) -> Result<Range<FT::Value>> {
        match v {
            Value::Object(entries) => {
                let mut range = Range::default();
                for (name, bound) in entries {
                    match name.as_str() {
                        "gt" => range.gt = Some(self.0.deserialize(bound)?),
                        "gte" => range.gte = Some(self.0.deserialize(bound)?),
                        "lt" => range.lt = Some(self.0.deserialize(bound)?),
                        "lte" => range.lte = Some(self.0.deserialize(bound)?),
                        _ => {}
                    }
                }
                Ok(range)
            }
            other => Err(Error::TypeMismatch {
                value: other,
                expected: "object",
            }),
        }
    }

    fn serialize_term(&self, t: &FT::Term) -> Value {
        self.0.serialize_term(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<FT::Term> {
        self.0.deserialize_term(v)
    }
}

/// Field type mapping a closed set of domain variants onto wire values of an
/// underlying scalar type.
///
/// The reverse lookup table is precomputed at construction.
pub struct EnumFieldType<V, FT: FieldType> {
    underlying: FT,
    target: &'static str,
    table: Vec<(FT::Term, V)>,
    to_term: fn(V) -> FT::Term,
}

impl<V, FT> EnumFieldType<V, FT>
where
    V: Copy,
    FT: FieldType,
    FT::Term: PartialEq,
{
    /// Builds the codec and its reverse lookup table.
    ///
    /// # Panics
    ///
    /// Panics if two variants map to the same wire value: the mapping must
    /// be a bijection, and a duplicate is a configuration error.
    pub fn new(
        target: &'static str,
        variants: &[V],
        to_term: fn(V) -> FT::Term,
        underlying: FT,
    ) -> Self {
        let mut table: Vec<(FT::Term, V)> = Vec::with_capacity(variants.len());
        for &variant in variants {
            let term = to_term(variant);
            assert!(
                !table.iter().any(|(existing, _)| *existing == term),
                "duplicate wire value for enum field type '{target}'"
            );
            table.push((term, variant));
        }
        Self {
            underlying,
            target,
            table,
            to_term,
        }
    }
}

impl<V: Copy> EnumFieldType<V, IntType> {
    /// Enum stored as integer wire values.
    pub fn int(target: &'static str, variants: &[V], to_term: fn(V) -> i32) -> Self {
        Self::new(target, variants, to_term, IntType)
    }
}

impl<V: Copy> EnumFieldType<V, KeywordType> {
    /// Enum stored as keyword wire values.
    pub fn keyword(target: &'static str, variants: &[V], to_term: fn(V) -> String) -> Self {
        Self::new(target, variants, to_term, KeywordType)
    }
}

impl<V, FT> Clone for EnumFieldType<V, FT>
where
    V: Copy,
    FT: FieldType + Clone,
    FT::Term: Clone,
{
    fn clone(&self) -> Self {
        Self {
            underlying: self.underlying.clone(),
            target: self.target,
            table: self.table.clone(),
            to_term: self.to_term,
        }
    }
}

impl<V, FT: FieldType> fmt::Debug for EnumFieldType<V, FT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumFieldType")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl<V, FT> FieldType for EnumFieldType<V, FT>
where
    V: Copy,
    FT: FieldType,
    FT::Term: PartialEq,
{
    type Value = V;
    type Term = V;

    fn name(&self) -> String {
        self.underlying.name()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Other
    }

    fn serialize(&self, v: &V) -> Value {
        self.underlying.serialize_term(&(self.to_term)(*v))
    }

    fn deserialize(&self, v: Value) -> Result<V> {
        let term = self.underlying.deserialize_term(v.clone())?;
        self.table
            .iter()
            .find(|(key, _)| *key == term)
            .map(|(_, variant)| *variant)
            .ok_or(Error::UnknownVariant {
                value: v,
                target: self.target,
            })
    }

    fn serialize_term(&self, t: &V) -> Value {
        self.serialize(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<V> {
        self.deserialize(v)
    }
}

/// Object field type (`object`) for sub-documents.
pub struct ObjectType<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> ObjectType<V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for ObjectType<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for ObjectType<V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<V> Copy for ObjectType<V> {}

impl<V> fmt::Debug for ObjectType<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ObjectType")
    }
}

fn deserialize_source<V: DocSource>(
    v: Value,
    factory: Option<&dyn Fn() -> V>,
    target: &'static str,
) -> Result<V> {
    let factory = factory.ok_or(Error::MissingSourceFactory { target })?;
    match v {
        source @ Value::Object(_) => {
            let mut doc = factory();
            doc.from_source(source)?;
            Ok(doc)
        }
        other => Err(Error::TypeMismatch {
            value: other,
            expected: "object",
        }),
    }
}

impl<V: DocSource> FieldType for ObjectType<V> {
    type Value = V;
    type Term = Infallible;

    fn name(&self) -> String {
        "object".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::None
    }

    fn serialize(&self, v: &V) -> Value {
        v.to_source()
    }

    fn deserialize(&self, v: Value) -> Result<V> {
        self.deserialize_with(v, None)
    }

    fn deserialize_with(&self, v: Value, factory: Option<&dyn Fn() -> V>) -> Result<V> {
        deserialize_source(v, factory, "object")
    }

    fn serialize_term(&self, t: &Infallible) -> Value {
        match *t {}
    }

    fn deserialize_term(&self, v: Value) -> Result<Infallible> {
        Err(Error::TypeMismatch {
            value: v,
            expected: "a term-queryable type",
        })
    }
}

/// Nested field type (`nested`): object semantics with independent matching
/// per element.
pub struct NestedType<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> NestedType<V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for NestedType<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for NestedType<V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<V> Copy for NestedType<V> {}

impl<V> fmt::Debug for NestedType<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NestedType")
    }
}

impl<V: DocSource> FieldType for NestedType<V> {
    type Value = V;
    type Term = Infallible;

    fn name(&self) -> String {
        "nested".to_string()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::None
    }

    fn serialize(&self, v: &V) -> Value {
        v.to_source()
    }

    fn deserialize(&self, v: Value) -> Result<V> {
        self.deserialize_with(v, None)
    }

    fn deserialize_with(&self, v: Value, factory: Option<&dyn Fn() -> V>) -> Result<V> {
        deserialize_source(v, factory, "nested")
    }

    fn serialize_term(&self, t: &Infallible) -> Value {
        match *t {}
    }

    fn deserialize_term(&self, v: Value) -> Result<Infallible> {
        Err(Error::TypeMismatch {
            value: v,
            expected: "a term-queryable type",
        })
    }
}

/// Object-like field type with a bound construction factory, so plain
/// deserialization needs no external factory.
pub struct SourceType<V, FT> {
    inner: FT,
    factory: fn() -> V,
}

impl<V, FT> SourceType<V, FT> {
    pub fn new(inner: FT, factory: fn() -> V) -> Self {
        Self { inner, factory }
    }
}

impl<V, FT: Clone> Clone for SourceType<V, FT> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            factory: self.factory,
        }
    }
}

impl<V, FT: Copy> Copy for SourceType<V, FT> {}

impl<V, FT: fmt::Debug> fmt::Debug for SourceType<V, FT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceType").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl<V, FT> FieldType for SourceType<V, FT>
where
    V: DocSource,
    FT: FieldType<Value = V, Term = Infallible>,
{
    type Value = V;
    type Term = Infallible;

    fn name(&self) -> String {
        self.inner.name()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::None
    }

    fn serialize(&self, v: &V) -> Value {
        self.inner.serialize(v)
    }

    fn deserialize(&self, v: Value) -> Result<V> {
        self.inner.deserialize_with(v, Some(&self.factory))
    }

    fn serialize_term(&self, t: &Infallible) -> Value {
        match *t {}
    }

    fn deserialize_term(&self, v: Value) -> Result<Infallible> {
        self.inner.deserialize_term(v)
    }
}

/// List wrapper admitting missing elements.
///
/// A scalar wire value is treated as a one-element sequence; term operations
/// delegate to the element type, since a term query against an array field
/// matches any element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptionalListType<FT>(pub FT);

impl<FT: FieldType> FieldType for OptionalListType<FT> {
    type Value = Vec<Option<FT::Value>>;
    type Term = FT::Term;

    fn name(&self) -> String {
        self.0.name()
    }

    fn term_kind(&self) -> TermKind {
        self.0.term_kind()
    }

    fn serialize(&self, v: &Vec<Option<FT::Value>>) -> Value {
        Value::Array(
            v.iter()
                .map(|element| match element {
                    Some(element) => self.0.serialize(element),
                    None => Value::Null,
                })
                .collect(),
        )
    }

    fn deserialize(&self, v: Value) -> Result<Vec<Option<FT::Value>>> {
        match v {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Null => Ok(None),
                    other => self.0.deserialize(other).map(Some),
                })
                .collect(),
            Value::Null => Ok(vec![None]),
            other => Ok(vec![Some(self.0.deserialize(other)?)]),
        }
    }

    fn serialize_term(&self, t: &FT::Term) -> Value {
        self.0.serialize_term(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<FT::Term> {
        self.0.deserialize_term(v)
    }
}

/// List wrapper rejecting missing elements.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RequiredListType<FT>(pub FT);

impl<FT: FieldType> FieldType for RequiredListType<FT> {
    type Value = Vec<FT::Value>;
    type Term = FT::Term;

    fn name(&self) -> String {
        self.0.name()
    }

    fn term_kind(&self) -> TermKind {
        self.0.term_kind()
    }

    fn serialize(&self, v: &Vec<FT::Value>) -> Value {
        Value::Array(v.iter().map(|element| self.0.serialize(element)).collect())
    }

    fn deserialize(&self, v: Value) -> Result<Vec<FT::Value>> {
        match v {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Null => Err(Error::NullElement),
                    other => self.0.deserialize(other),
                })
                .collect(),
            Value::Null => Err(Error::NullElement),
            other => Ok(vec![self.0.deserialize(other)?]),
        }
    }

    fn serialize_term(&self, t: &FT::Term) -> Value {
        self.0.serialize_term(t)
    }

    fn deserialize_term(&self, v: Value) -> Result<FT::Term> {
        self.0.deserialize_term(v)
    }
}
