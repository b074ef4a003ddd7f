//! Storage contract shared by every backend

use async_trait::async_trait;

use crate::types::{BrowserId, ItemId, ItemRecord, SubjectKey};

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Persistence trait for items and sessions.
///
/// Every method is a single transaction. Implementations provide their own
/// isolation and must be safe to call from many tasks at once; callers never
/// wrap them in an additional lock.
#[async_trait]
pub trait ItemStore: Send + Sync {
    // ── Items ──

    /// Insert or overwrite the item stored under (subject, item).
    async fn put_item(
        &self,
        subject: &SubjectKey,
        item: &ItemId,
        record: &ItemRecord,
    ) -> Result<(), StoreError>;

    async fn get_item(
        &self,
        subject: &SubjectKey,
        item: &ItemId,
    ) -> Result<Option<ItemRecord>, StoreError>;

    /// All items of a subject. Order is storage-defined.
    async fn list_items(&self, subject: &SubjectKey)
        -> Result<Vec<(ItemId, ItemRecord)>, StoreError>;

    /// Remove an item. Returns whether a record existed.
    async fn delete_item(&self, subject: &SubjectKey, item: &ItemId) -> Result<bool, StoreError>;

    // ── Sessions ──

    /// Bind a browser to a subject, replacing any previous binding.
    async fn put_session(&self, browser: &BrowserId, subject: &SubjectKey)
        -> Result<(), StoreError>;

    async fn get_session(&self, browser: &BrowserId) -> Result<Option<SubjectKey>, StoreError>;
}
