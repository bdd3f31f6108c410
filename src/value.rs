//! Dynamically typed datastore values.
//!
//! The device does not publish a schema; the JSON encoding of each response
//! decides the type of every value. Integers and fractional numbers arrive as
//! JSON numbers, booleans are encoded as the numbers 0/1 (the API has no
//! native boolean), and everything else is a string.

use serde::{Deserialize, Serialize};

/// A single datastore value.
///
/// The variant is chosen by the wire encoding: a JSON integer becomes
/// `Int`, a fractional number becomes `Float`, `true`/`false` become `Bool`
/// and strings become `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON boolean
    Bool(bool),
    /// JSON integer
    Int(i64),
    /// JSON fractional number
    Float(f64),
    /// JSON string
    Text(String),
}

impl Value {
    /// Name of the stored type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    /// Reads the value as a float.
    ///
    /// Integers widen to `f64`; the wire has a single numeric type, so the
    /// int/float split is an encoding artifact, not a type distinction.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Reads the value as an integer.
    ///
    /// Accepts floats without a fractional part.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Reads the value as a boolean.
    ///
    /// The device encodes booleans as 0/1 numbers, so any numeric value is
    /// accepted: exactly 1 is `true`, everything else is `false`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int(v) => Some(*v == 1),
            Value::Float(v) => Some(*v == 1.0),
            _ => None,
        }
    }

    /// Reads the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
