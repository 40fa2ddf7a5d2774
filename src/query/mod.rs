//! WHERE-clause query language (`spec.md` §4.D).
//!
//! A real lexer (`lexer`) and recursive-descent parser (`parser`) produce an
//! `Or(And(Cond...)...)` AST (`ast`); `planner` probes indexes to narrow
//! candidates before `evaluator` re-checks every condition against them.

mod ast;
mod evaluator;
mod lexer;
mod planner;
mod parser;

pub use ast::Query;

use crate::error::ValidationError;
use crate::model::Vertex;
use crate::storage::IndexManager;
use std::collections::HashMap;
use uuid::Uuid;

/// Parses and runs a `WHERE ...` query string against `vertices`, returning
/// matching vertex ids paired with their data.
pub fn run<'a>(
    vertices: &'a HashMap<Uuid, Vertex>,
    indexes: &IndexManager,
    query_string: &str,
    cast_non_strings: bool,
    case_sensitive: bool,
) -> Result<Vec<(Uuid, &'a Vertex)>, ValidationError> {
    let query = parser::parse(query_string)?;
    planner::execute(vertices, indexes, &query, case_sensitive, cast_non_strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn vertex(attr: &str, value: Value) -> Vertex {
        let mut v = Vertex::new(HashMap::new());
        v.value.insert(attr.to_string(), value);
        v
    }

    #[test]
    fn end_to_end_query_with_and_or_and_regex() {
        let mut vertices = HashMap::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut alice_v = vertex("name", Value::String("Alice".to_string()));
        alice_v.value.insert("age".to_string(), Value::Int(30));
        vertices.insert(alice, alice_v);
        let mut bob_v = vertex("name", Value::String("Bob".to_string()));
        bob_v.value.insert("age".to_string(), Value::Int(40));
        vertices.insert(bob, bob_v);

        let indexes = IndexManager::new();
        let result = run(&vertices, &indexes, "WHERE name REGEX ^A", false, true).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0, alice);

        let result = run(&vertices, &indexes, "WHERE age = 30 OR age = 40", false, true).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn malformed_query_is_rejected() {
        let vertices = HashMap::new();
        let indexes = IndexManager::new();
        assert!(run(&vertices, &indexes, "age = 30", false, true).is_err());
    }

    #[test]
    fn unparseable_literal_against_a_numeric_attribute_aborts_the_query() {
        let mut vertices = HashMap::new();
        vertices.insert(Uuid::new_v4(), vertex("age", Value::Int(30)));
        let indexes = IndexManager::new();
        assert!(run(&vertices, &indexes, "WHERE age = thirty", false, true).is_err());
    }
}
