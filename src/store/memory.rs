//! In-memory store used by tests and local experiments

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{ItemStore, StoreError};
use crate::types::{BrowserId, ItemId, ItemRecord, SubjectKey};

/// `ItemStore` backed by two hash maps, one lock each
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<SubjectKey, HashMap<ItemId, ItemRecord>>>,
    sessions: RwLock<HashMap<BrowserId, SubjectKey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn put_item(
        &self,
        subject: &SubjectKey,
        item: &ItemId,
        record: &ItemRecord,
    ) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .entry(*subject)
            .or_default()
            .insert(*item, record.clone());
        Ok(())
    }

    async fn get_item(
        &self,
        subject: &SubjectKey,
        item: &ItemId,
    ) -> Result<Option<ItemRecord>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .get(subject)
            .and_then(|items| items.get(item))
            .cloned())
    }

    async fn list_items(
        &self,
        subject: &SubjectKey,
    ) -> Result<Vec<(ItemId, ItemRecord)>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .get(subject)
            .map(|items| items.iter().map(|(k, v)| (*k, v.clone())).collect())
            .unwrap_or_default())
    }

    async fn delete_item(&self, subject: &SubjectKey, item: &ItemId) -> Result<bool, StoreError> {
        Ok(self
            .items
            .write()
            .await
            .get_mut(subject)
            .map(|items| items.remove(item).is_some())
            .unwrap_or(false))
    }

    async fn put_session(
        &self,
        browser: &BrowserId,
        subject: &SubjectKey,
    ) -> Result<(), StoreError> {
        self.sessions.write().await.insert(*browser, *subject);
        Ok(())
    }

    async fn get_session(&self, browser: &BrowserId) -> Result<Option<SubjectKey>, StoreError> {
        Ok(self.sessions.read().await.get(browser).copied())
    }
}
