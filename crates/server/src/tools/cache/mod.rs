//! Cache inspection MCP tools.
//!
//! This module provides read-only views of the response store.

pub mod get;
pub mod namespaces;

pub use get::{CacheGetParams, get_impl};
pub use namespaces::{CacheNamespacesParams, namespaces_impl};
