//! CLI command implementations.

pub mod components;
pub mod generate;
pub mod schema;
