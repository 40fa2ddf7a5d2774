use serde::{Deserialize, Serialize};

/// Properties attached to an undirected edge. Both endpoints store an
/// identical copy — see `spec.md` invariant 2 (symmetric adjacency).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl EdgeProps {
    pub fn new(label: Option<String>, weight: Option<f64>) -> Self {
        Self { label, weight }
    }
}
