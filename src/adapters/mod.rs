//! Adapters: implementations of domain ports against external systems.

pub mod github;
pub mod sqlite;
