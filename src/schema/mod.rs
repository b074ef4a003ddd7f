//! Schema graph: which auxiliary items accompany a primary item
//!
//! Loaded once from the `didgraph` YAML definition at startup and shared
//! read-only afterwards.

mod graph;

pub use graph::{SchemaDefinition, SchemaError, SchemaGraph, SchemaNode};
