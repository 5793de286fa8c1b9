//! FILENAME: engine/src/value.rs
//! PURPOSE: Defines the typed value a part attribute can hold.
//! CONTEXT: Raw attribute values arrive as strings and are coerced into
//! `ParamValue` before any sorting, grouping, or formula evaluation
//! happens. The variant split between Int and Float is deliberate:
//! integer attributes sort, group, and compute exactly, while float
//! attributes carry measurement-style values.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The computed value of one attribute on one part.
///
/// Ordering is total: numeric values sort before text, and Int/Float
/// compare by numeric value, so `Int(10)` and `Float(10.0)` are equal
/// for sorting, grouping, and value-set deduplication. Text compares
/// lexicographically. `Float` payloads are never NaN or infinite; the
/// evaluator and the raw-value coercion reject non-finite numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Coerces a raw string attribute into a typed value.
    ///
    /// A value containing a decimal point must parse as floating point
    /// (None on failure, a fatal input error at the call site); any
    /// other value is tried as an integer, and on failure kept as the
    /// original text. This supports categorical attributes like
    /// "Grid layout 2" alongside numeric ones.
    pub fn parse_raw(raw: &str) -> Option<ParamValue> {
        let trimmed = raw.trim();
        if trimmed.contains('.') {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(ParamValue::Float)
        } else {
            match trimmed.parse::<i64>() {
                Ok(n) => Some(ParamValue::Int(n)),
                Err(_) => Some(ParamValue::Text(raw.to_string())),
            }
        }
    }

    /// Returns the numeric value, if this is a numeric variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(n) => Some(*n as f64),
            ParamValue::Float(f) => Some(*f),
            ParamValue::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ParamValue::Text(_))
    }

    /// Short variant name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Int(_) => "integer",
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "text",
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

// Valid because Float payloads are guaranteed finite (no NaN).
impl Eq for ParamValue {}

impl PartialOrd for ParamValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParamValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ParamValue::Int(a), ParamValue::Int(b)) => a.cmp(b),
            (ParamValue::Text(a), ParamValue::Text(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                // Numbers sort before text
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Float(f)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}
