//! HTTP client for harbor.
//!
//! This crate provides the reqwest-backed transport that the policy engine
//! reaches through its `Network` trait.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
