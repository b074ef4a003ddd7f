//! Top-level error types
//!
//! Aggregates the per-module error enums into a single error for the
//! application boundary. Each module keeps its own enum so callers can match
//! on the failures they actually handle.

use thiserror::Error;

/// Main error type for gateway startup and wiring
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Schema error: {0}")]
    Schema(#[from] crate::schema::SchemaError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Backend error: {0}")]
    Backend(#[from] crate::backend::BackendError),

    #[error("Multiplexer error: {0}")]
    Multiplex(#[from] crate::multiplexer::MultiplexError),

    #[error("Invalid key: {0}")]
    Key(#[from] crate::types::KeyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
