//! HTTP facade over the embedded engine (feature = "server").

pub mod http;

pub use http::router;
