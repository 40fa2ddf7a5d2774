use super::EdgeProps;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A single vertex: its attribute map plus its adjacency (neighbor id ->
/// edge properties). Matches the `<base>_nodes.json` record shape:
/// `{ "value": {...}, "edges": { "<id>": {label?, weight?} } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub value: HashMap<String, Value>,
    #[serde(default)]
    pub edges: HashMap<Uuid, EdgeProps>,
}

impl Vertex {
    pub fn new(value: HashMap<String, Value>) -> Self {
        Self {
            value,
            edges: HashMap::new(),
        }
    }
}
