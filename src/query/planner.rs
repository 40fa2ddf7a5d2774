//! Index-aware candidate selection (`spec.md` §4.D).
//!
//! For each AND-group, if any of its conditions is an `=`/`IN` test against
//! an indexed vertex attribute, the index is probed and only the resulting
//! candidate ids are checked against the *rest* of the group's conditions
//! (every condition is still re-evaluated — the index only narrows the
//! starting set, it never substitutes for evaluation). If no condition in a
//! group qualifies, or the group contains any `edge.*` condition, the group
//! falls back to scanning every vertex.

use super::ast::{AndGroup, Key, Literal, Op, Query};
use super::evaluator::vertex_matches;
use crate::error::ValidationError;
use crate::model::Vertex;
use crate::storage::IndexManager;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A parse failure while re-evaluating a numeric/boolean condition aborts
/// the whole query (`spec.md` §4.D) — propagated rather than swallowed.
pub fn execute<'a>(
    vertices: &'a HashMap<Uuid, Vertex>,
    indexes: &IndexManager,
    query: &Query,
    case_sensitive: bool,
    cast_non_strings: bool,
) -> Result<Vec<(Uuid, &'a Vertex)>, ValidationError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for group in &query.groups {
        for (id, vertex) in candidates_for_group(vertices, indexes, group) {
            if seen.contains(&id) {
                continue;
            }
            let mut matched = true;
            for c in group {
                if !vertex_matches(vertex, c, case_sensitive, cast_non_strings)? {
                    matched = false;
                    break;
                }
            }
            if matched {
                seen.insert(id);
                out.push((id, vertex));
            }
        }
    }
    Ok(out)
}

fn candidates_for_group<'a>(
    vertices: &'a HashMap<Uuid, Vertex>,
    indexes: &IndexManager,
    group: &AndGroup,
) -> Vec<(Uuid, &'a Vertex)> {
    if group.iter().any(|c| matches!(c.key, Key::Edge(_))) {
        return vertices.iter().map(|(id, v)| (*id, v)).collect();
    }
    for cond in group {
        let Key::Attr(attr) = &cond.key else { continue };
        if !indexes.is_indexed(attr) {
            continue;
        }
        let ids: Option<HashSet<Uuid>> = match (&cond.op, &cond.value) {
            (Op::Eq, Literal::Single(key)) => indexes.equals(attr, key).cloned(),
            (Op::In, Literal::List(keys)) => indexes.in_set(attr, keys),
            _ => None,
        };
        if let Some(ids) = ids {
            return ids
                .into_iter()
                .filter_map(|id| vertices.get(&id).map(|v| (id, v)))
                .collect();
        }
    }
    vertices.iter().map(|(id, v)| (*id, v)).collect()
}
