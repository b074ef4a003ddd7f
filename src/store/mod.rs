//! Local store: per-subject data items and browser session bindings
//!
//! The gateway talks to storage exclusively through the [`ItemStore`] trait,
//! so the multiplexer and flows run unchanged against the sqlite store in
//! production and the in-memory store in tests.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ItemStore, StoreError};
