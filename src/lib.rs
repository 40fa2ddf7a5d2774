//! An embeddable, file-backed property graph database: vertices and
//! undirected edges, secondary indexes, a WHERE-clause query language,
//! shortest-path search, and single-writer transactions, wrapped in a
//! catalog of independently named databases.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod query;
pub mod storage;
pub mod utils;
pub mod value;

#[cfg(feature = "server")]
pub mod api;

pub use catalog::Catalog;
pub use config::Config;
pub use engine::GraphEngine;
pub use error::{DBError, DBResult};
pub use value::Value;
