//! Unified error type for the engine.
//!
//! Layered the way the teacher repo's `src/core/error/mod.rs` aggregates
//! per-module error enums into one `DBError` via `#[from]`: each of
//! `spec.md` §7's four error categories gets its own small enum, and
//! `DBError` wraps them. The fifth category, warnings, is never returned as
//! an `Err` — it is logged (see each module's use of `log::warn!`).

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("attribute map must not be empty")]
    EmptyAttributes,
    /// `spec.md` §4.A lists bad-type as an `add_node`/`update_node` failure
    /// mode; here the `Value` enum already restricts attributes to the four
    /// scalar kinds at the type level, so the only place this can still
    /// surface is a JSON request body deserialized from outside the engine
    /// (the HTTP facade) — kept for that boundary and for API parity.
    #[error("attribute '{0}' must be a string, integer, float, or boolean")]
    BadType(String),
    #[error("cannot add an edge from a vertex to itself")]
    SelfLoop,
    #[error("edge between {0} and {1} already exists")]
    DuplicateEdge(Uuid, Uuid),
    /// Same reasoning as `BadType`: `add_edge`'s `weight: Option<f64>`
    /// parameter is numeric by construction in the embedded API.
    #[error("edge weight must be numeric")]
    BadWeight,
    #[error("index on '{0}' already exists")]
    IndexAlreadyExists(String),
    #[error("no index exists on '{0}'")]
    IndexNotFound(String),
    #[error("malformed query: {0}")]
    MalformedQuery(String),
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(String),
    #[error("value '{0}' cannot be compared with attribute's type")]
    TypeMismatch(String),
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),
    #[error("database '{0}' already exists")]
    DuplicateDatabase(String),
    #[error("name must match [A-Za-z0-9_-]+: '{0}'")]
    InvalidName(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum NotFoundError {
    #[error("vertex {0} not found")]
    Vertex(Uuid),
    #[error("no edge exists between {0} and {1}")]
    Edge(Uuid, Uuid),
    #[error("database '{0}' does not exist")]
    Database(String),
    #[error("no database selected")]
    NoActiveDatabase,
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("a transaction is already in progress")]
    AlreadyActive,
    #[error("no transaction in progress")]
    NoActiveTransaction,
}

#[derive(Error, Debug)]
pub enum IoError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum DBError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

pub type DBResult<T> = Result<T, DBError>;
