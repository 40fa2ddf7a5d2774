//! Scalar value type shared by vertex attributes and edge properties.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A vertex attribute or edge property value.
///
/// Exactly the four scalar kinds `spec.md` allows: string, integer,
/// floating-point, boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Canonical string form used as an index value-key. Unmodified — not
    /// lowercased — per the Open Question resolution in SPEC_FULL.md §4.
    pub fn stringify(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Value::Bool(b) => b.to_string(),
        }
    }

    /// Parses a bare command-line token into a `Value`, trying bool, then
    /// int, then float, then falling back to string — the order `add`/
    /// `update` use in the original CLI.
    pub fn parse_token(token: &str) -> Value {
        match token.to_lowercase().as_str() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
        if let Ok(i) = token.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = token.parse::<f64>() {
            return Value::Float(f);
        }
        Value::String(token.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stringify())
    }
}
