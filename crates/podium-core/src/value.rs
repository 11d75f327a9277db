//! Scalar cell values and their comparison/normalization rules.
//!
//! A cell is one of {null, integer, float, string}. Booleans, dates and binary
//! payloads are not part of the data model; they stay strings.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Type of a non-null value. `None` for null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(DataType::Int64),
            Value::Float(_) => Some(DataType::Float64),
            Value::Str(_) => Some(DataType::Utf8),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Infer a value from raw cell text: integer, then finite float, else string.
    ///
    /// Null tokens are the reader's concern; this never returns `Null`.
    pub fn infer(raw: &str) -> Value {
        let t = raw.trim();
        if looks_numeric(t) {
            if let Ok(i) = t.parse::<i64>() {
                return Value::Int(i);
            }
            if let Ok(f) = t.parse::<f64>() {
                if f.is_finite() {
                    return Value::Float(f);
                }
            }
        }
        Value::Str(raw.to_string())
    }

    /// Parse raw cell text as a declared type. Unparseable numbers become null.
    pub fn parse_as(raw: &str, data_type: DataType) -> Value {
        let t = raw.trim();
        match data_type {
            DataType::Utf8 => Value::Str(raw.to_string()),
            DataType::Int64 => match t.parse::<i64>() {
                Ok(i) => Value::Int(i),
                // "2012.0" in an integer column
                Err(_) => match t.parse::<f64>() {
                    Ok(f) if f.is_finite() && f.fract() == 0.0 => Value::Int(f as i64),
                    _ => Value::Null,
                },
            },
            DataType::Float64 => match t.parse::<f64>() {
                Ok(f) if f.is_finite() => Value::Float(f),
                _ => Value::Null,
            },
        }
    }

    /// Normalized identity used by join and group keys.
    ///
    /// Integral floats and numeric strings collapse onto the integer form so
    /// `"2012"`, `2012` and `2012.0` all address the same key.
    pub fn key(&self) -> KeyPart {
        match self {
            Value::Null => KeyPart::Null,
            Value::Int(i) => KeyPart::Int(*i),
            Value::Float(f) => float_key(*f),
            Value::Str(s) => {
                let t = s.trim();
                if looks_numeric(t) {
                    if let Ok(i) = t.parse::<i64>() {
                        return KeyPart::Int(i);
                    }
                    if let Ok(f) = t.parse::<f64>() {
                        return float_key(f);
                    }
                }
                KeyPart::Str(s.clone())
            }
        }
    }
}

/// Hashable, totally-ordered projection of a [`Value`] for keyed lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Null,
    Int(i64),
    Float(u64),
    Str(String),
}

impl KeyPart {
    pub fn is_null(&self) -> bool {
        matches!(self, KeyPart::Null)
    }
}

fn float_key(f: f64) -> KeyPart {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        KeyPart::Int(f as i64)
    } else {
        KeyPart::Float(f.to_bits())
    }
}

fn looks_numeric(t: &str) -> bool {
    match t.as_bytes().first() {
        Some(b) => b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.'),
        None => false,
    }
}

/// Total order over values: numbers (compared numerically across int/float),
/// then strings, then null.
pub fn total_cmp(a: &Value, b: &Value) -> Ordering {
    use Value::*;
    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Null, _) => Ordering::Greater,
        (_, Null) => Ordering::Less,
        (Int(x), Int(y)) => x.cmp(y),
        (Str(x), Str(y)) => x.cmp(y),
        (Str(_), _) => Ordering::Greater,
        (_, Str(_)) => Ordering::Less,
        _ => {
            // both numeric, at least one float
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
