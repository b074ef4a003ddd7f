//! ProxyU data gateway
//!
//! Bridges browsers to a ProxyU data authority. Browsers pair with a subject,
//! ask the subject for access to data items and list what they hold. The
//! authority pushes data and asks for it back over one long-lived stream,
//! which this crate multiplexes and answers from a local sqlite store.

pub mod backend;
pub mod config;
pub mod error;
pub mod flows;
pub mod multiplexer;
pub mod proto;
pub mod schema;
pub mod server;
pub mod store;
pub mod types;

pub use error::{GatewayError, Result};
