//! Condition evaluation and type coercion (`spec.md` §4.D).
//!
//! Coercion rules, ported from `ADBMS/kk.py`'s inline `query` comparison
//! logic: a literal is parsed as a float if it contains a `.`, else as an
//! int, whenever the stored attribute is numeric; as `true`/`false` when the
//! attribute is boolean. A parse failure against a numeric or boolean
//! attribute is a `ValueError` in the source that aborts the whole query —
//! *not* a false match — and that is reproduced here via `Result`. The one
//! case that is genuinely never an error is an order comparison (`>`, `<`,
//! `>=`, `<=`) against an attribute that isn't numeric at all: that's a type
//! mismatch, evaluated as `false`, per `spec.md` §4.D. `CASE_SENSITIVE` only
//! affects string equality/contains/regex; numeric comparisons are
//! unaffected by it.

use super::ast::{Condition, Key, Literal, Op};
use crate::error::ValidationError;
use crate::model::Vertex;
use crate::value::Value;
use regex::Regex;

pub fn vertex_matches(
    vertex: &Vertex,
    cond: &Condition,
    case_sensitive: bool,
    cast_non_strings: bool,
) -> Result<bool, ValidationError> {
    match &cond.key {
        Key::Attr(attr) => match vertex.value.get(attr) {
            Some(value) => eval(value, &cond.op, &cond.value, case_sensitive, cast_non_strings),
            None => Ok(false),
        },
        // Edge-property parse failures never abort the query — `ADBMS/kk.py`'s
        // edge-condition branch catches the same `ValueError` locally and
        // just treats that one edge as a non-match.
        Key::Edge(prop) => Ok(vertex.edges.values().any(|edge| match prop.as_str() {
            "weight" => edge.weight.map(Value::Float).is_some_and(|v| {
                eval(&v, &cond.op, &cond.value, case_sensitive, cast_non_strings).unwrap_or(false)
            }),
            "label" => edge.label.as_ref().is_some_and(|l| {
                eval(&Value::String(l.clone()), &cond.op, &cond.value, case_sensitive, cast_non_strings)
                    .unwrap_or(false)
            }),
            _ => false,
        })),
    }
}

fn eval(
    value: &Value,
    op: &Op,
    literal: &Literal,
    case_sensitive: bool,
    cast_non_strings: bool,
) -> Result<bool, ValidationError> {
    match op {
        Op::Eq => cmp_eq(value, literal, case_sensitive),
        Op::Ne => cmp_eq(value, literal, case_sensitive).map(|b| !b),
        Op::Gt => Ok(cmp_order(value, literal)?.is_some_and(|o| o.is_gt())),
        Op::Lt => Ok(cmp_order(value, literal)?.is_some_and(|o| o.is_lt())),
        Op::Ge => Ok(cmp_order(value, literal)?.is_some_and(|o| !o.is_lt())),
        Op::Le => Ok(cmp_order(value, literal)?.is_some_and(|o| !o.is_gt())),
        Op::In => match literal {
            Literal::List(items) => {
                for item in items {
                    if cmp_eq(value, &Literal::Single(item.clone()), case_sensitive)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Literal::Single(_) => Ok(false),
        },
        Op::Contains => {
            let Literal::Single(needle) = literal else { return Ok(false) };
            let text = match value {
                Value::String(s) => Some(s.clone()),
                _ if cast_non_strings => Some(value.stringify()),
                _ => None,
            };
            Ok(match text {
                Some(s) if case_sensitive => s.contains(needle.as_str()),
                Some(s) => s.to_lowercase().contains(&needle.to_lowercase()),
                None => false,
            })
        }
        Op::Regex => match (value, literal) {
            (Value::String(s), Literal::Single(pattern)) => {
                let built = if case_sensitive {
                    Regex::new(pattern)
                } else {
                    Regex::new(&format!("(?i){pattern}"))
                };
                Ok(built.map(|re| re.is_match(s)).unwrap_or(false))
            }
            _ => Ok(false),
        },
    }
}

/// Equality with the source's coercion-by-stored-type rule. Numeric and
/// boolean attributes require the literal to parse; failure propagates as
/// `TypeMismatch` rather than silently failing to match.
fn cmp_eq(value: &Value, literal: &Literal, case_sensitive: bool) -> Result<bool, ValidationError> {
    let Literal::Single(text) = literal else {
        return Ok(false);
    };
    match value {
        Value::Int(_) | Value::Float(_) => {
            let parsed = parse_numeric(text)
                .ok_or_else(|| ValidationError::TypeMismatch(text.clone()))?;
            Ok(value.as_f64() == Some(parsed))
        }
        Value::Bool(b) => Ok(*b == (text.to_lowercase() == "true")),
        Value::String(s) => Ok(if case_sensitive {
            s == text
        } else {
            s.eq_ignore_ascii_case(text)
        }),
    }
}

/// `None` means "not comparable" (non-numeric attribute) and evaluates to
/// `false` without error. A numeric attribute whose literal fails to parse
/// is an `Err`, aborting the query, matching `ADBMS/kk.py`'s shared
/// `except ValueError` around every comparison branch.
fn cmp_order(value: &Value, literal: &Literal) -> Result<Option<std::cmp::Ordering>, ValidationError> {
    let Literal::Single(text) = literal else {
        return Ok(None);
    };
    let Some(lhs) = value.as_f64() else {
        return Ok(None);
    };
    let rhs = parse_numeric(text).ok_or_else(|| ValidationError::TypeMismatch(text.clone()))?;
    Ok(lhs.partial_cmp(&rhs))
}

fn parse_numeric(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vertex_with(attr: &str, value: Value) -> Vertex {
        let mut v = Vertex::new(HashMap::new());
        v.value.insert(attr.to_string(), value);
        v
    }

    fn cond(key: &str, op: Op, literal: &str) -> Condition {
        Condition { key: Key::parse(key), op, value: Literal::Single(literal.to_string()) }
    }

    #[test]
    fn numeric_equality_across_int_and_float_literal() {
        let v = vertex_with("age", Value::Int(30));
        assert!(vertex_matches(&v, &cond("age", Op::Eq, "30"), true, false).unwrap());
        assert!(vertex_matches(&v, &cond("age", Op::Eq, "30.0"), true, false).unwrap());
    }

    #[test]
    fn order_comparison_on_non_numeric_is_false_not_error() {
        let v = vertex_with("name", Value::String("Alice".to_string()));
        assert!(!vertex_matches(&v, &cond("name", Op::Gt, "5"), true, false).unwrap());
    }

    #[test]
    fn order_comparison_with_unparseable_literal_against_numeric_attr_is_an_error() {
        let v = vertex_with("age", Value::Int(30));
        assert!(vertex_matches(&v, &cond("age", Op::Gt, "abc"), true, false).is_err());
    }

    #[test]
    fn equality_with_unparseable_literal_against_numeric_attr_is_an_error() {
        let v = vertex_with("age", Value::Int(30));
        assert!(vertex_matches(&v, &cond("age", Op::Eq, "abc"), true, false).is_err());
    }

    #[test]
    fn case_insensitive_string_equality_when_flag_off() {
        let v = vertex_with("name", Value::String("Alice".to_string()));
        assert!(vertex_matches(&v, &cond("name", Op::Eq, "alice"), false, false).unwrap());
        assert!(!vertex_matches(&v, &cond("name", Op::Eq, "alice"), true, false).unwrap());
    }

    #[test]
    fn contains_respects_case_sensitivity() {
        let v = vertex_with("name", Value::String("Alice".to_string()));
        assert!(vertex_matches(&v, &cond("name", Op::Contains, "ALI"), false, false).unwrap());
        assert!(!vertex_matches(&v, &cond("name", Op::Contains, "ALI"), true, false).unwrap());
    }

    #[test]
    fn contains_with_cast_matches_non_string_attribute() {
        let v = vertex_with("age", Value::Int(30));
        assert!(vertex_matches(&v, &cond("age", Op::Contains, "3"), true, true).unwrap());
        assert!(!vertex_matches(&v, &cond("age", Op::Contains, "3"), true, false).unwrap());
    }

    #[test]
    fn in_operator_matches_any_member() {
        let v = vertex_with("age", Value::Int(30));
        let c = Condition {
            key: Key::parse("age"),
            op: Op::In,
            value: Literal::List(vec!["25".to_string(), "30".to_string()]),
        };
        assert!(vertex_matches(&v, &c, true, false).unwrap());
    }

    #[test]
    fn edge_weight_condition_matches_any_incident_edge() {
        use crate::model::EdgeProps;
        let mut v = Vertex::new(HashMap::new());
        let other = uuid::Uuid::new_v4();
        v.edges.insert(other, EdgeProps::new(None, Some(5.0)));
        assert!(vertex_matches(&v, &cond("edge.weight", Op::Gt, "1"), true, false).unwrap());
        assert!(!vertex_matches(&v, &cond("edge.weight", Op::Gt, "10"), true, false).unwrap());
    }

    #[test]
    fn edge_weight_condition_with_unparseable_literal_is_false_not_error() {
        // kk.py's edge branch catches ValueError locally; it never aborts.
        let mut v = Vertex::new(HashMap::new());
        let other = uuid::Uuid::new_v4();
        v.edges.insert(other, crate::model::EdgeProps::new(None, Some(5.0)));
        assert!(!vertex_matches(&v, &cond("edge.weight", Op::Gt, "abc"), true, false).unwrap());
    }
}
