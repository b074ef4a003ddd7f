//! Correlation table: outstanding retrieve requests keyed by subject ‖ item
//!
//! The table is the only mutable state shared between the multiplexer's
//! reader, its writer side and the callers of `submit`. All access goes
//! through the single mutex below. Entries are removed while holding the lock
//! and delivered to after releasing it, so a slow waiter never blocks
//! registration.

use std::collections::HashMap;

use tokio::sync::{mpsc, Mutex};

use super::{Delivery, MultiplexError};
use crate::types::CorrelationKey;

/// Delivery target of one pending correlation
pub(crate) type DeliverySender = mpsc::Sender<Delivery>;

#[derive(Default)]
pub(crate) struct CorrelationTable {
    pending: Mutex<HashMap<CorrelationKey, DeliverySender>>,
}

impl CorrelationTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register `key` and hand back the receiving side of its delivery queue.
    ///
    /// Fails with `AlreadyPending` while a previous request for the same key
    /// is in flight; the existing registration is left untouched.
    pub(crate) async fn register(
        &self,
        key: CorrelationKey,
        capacity: usize,
    ) -> Result<mpsc::Receiver<Delivery>, MultiplexError> {
        let mut pending = self.pending.lock().await;
        if pending.contains_key(&key) {
            return Err(MultiplexError::AlreadyPending(key));
        }
        let (tx, rx) = mpsc::channel(capacity.max(1));
        pending.insert(key, tx);
        Ok(rx)
    }

    /// Remove and return the delivery target for `key`, if registered.
    pub(crate) async fn take(&self, key: &CorrelationKey) -> Option<DeliverySender> {
        self.pending.lock().await.remove(key)
    }

    /// Drop every registration, closing all delivery queues.
    pub(crate) async fn close_all(&self) -> usize {
        let mut pending = self.pending.lock().await;
        let count = pending.len();
        pending.clear();
        count
    }

    pub(crate) async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemId, SubjectKey};
    use uuid::Uuid;

    fn key(fill: u8) -> CorrelationKey {
        CorrelationKey::new(
            SubjectKey::new([fill; 32]),
            ItemId::from_uuid(Uuid::from_bytes([fill; 16])),
        )
    }

    #[tokio::test]
    async fn test_second_registration_is_rejected() {
        let table = CorrelationTable::new();
        let _rx = table.register(key(1), 4).await.unwrap();

        let err = table.register(key(1), 4).await.unwrap_err();
        assert!(matches!(err, MultiplexError::AlreadyPending(k) if k == key(1)));

        // A different key is independent
        assert!(table.register(key(2), 4).await.is_ok());
        assert_eq!(table.len().await, 2);
    }

    #[tokio::test]
    async fn test_take_frees_the_key() {
        let table = CorrelationTable::new();
        let _rx = table.register(key(1), 4).await.unwrap();

        assert!(table.take(&key(1)).await.is_some());
        assert!(table.take(&key(1)).await.is_none());
        assert!(table.register(key(1), 4).await.is_ok());
    }

    #[tokio::test]
    async fn test_close_all_closes_receivers() {
        let table = CorrelationTable::new();
        let mut rx = table.register(key(1), 4).await.unwrap();

        assert_eq!(table.close_all().await, 1);
        assert!(rx.recv().await.is_none());
        assert_eq!(table.len().await, 0);
    }
}
