//! Permissions listing with on-demand fetch of granted items

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::future::join_all;
use serde::{Serialize, Serializer};

use crate::multiplexer::{FetchedField, Multiplexer, PLACEHOLDER_NODE_MIME};
use crate::store::{ItemStore, StoreError};
use crate::types::{ItemId, ItemRecord, ItemStatus, SubjectKey};

/// One listing entry as the frontend reads it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionEntry {
    pub status: i32,
    #[serde(serialize_with = "as_base64")]
    pub value: Vec<u8>,
}

impl PermissionEntry {
    fn from_record(record: &ItemRecord) -> Self {
        Self {
            status: record.status.code(),
            value: record.payload.clone(),
        }
    }
}

fn as_base64<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(value))
}

/// Item identifier text -> entry
pub type PermissionListing = BTreeMap<String, PermissionEntry>;

/// List every item held for `subject`.
///
/// Items that are granted but not fetched yet are requested from the
/// authority concurrently. Fields that come back are stored as fetched and
/// listed under their own identifiers. A granted item whose fetch succeeds
/// leaves the granted state: it takes the field delivered under its own
/// identifier, or a node record with an empty payload when the response only
/// carried its children. A granted item whose fetch is rejected or already
/// in flight keeps its sentinel entry.
pub async fn list_permissions(
    store: &dyn ItemStore,
    multiplexer: &Multiplexer,
    subject: SubjectKey,
) -> Result<PermissionListing, StoreError> {
    let records = store.list_items(&subject).await?;

    let mut listing = PermissionListing::new();
    let mut pending = Vec::new();
    for (item, record) in &records {
        listing.insert(item.to_string(), PermissionEntry::from_record(record));
        if record.status == ItemStatus::Granted {
            pending.push(*item);
        }
    }

    if pending.is_empty() {
        return Ok(listing);
    }
    tracing::debug!(%subject, count = pending.len(), "Fetching granted items");

    let fetched = join_all(
        pending
            .iter()
            .map(|item| fetch(multiplexer, *item, subject)),
    )
    .await;

    for (item, fields) in pending.into_iter().zip(fetched) {
        let Some(fields) = fields else {
            continue;
        };

        let mut records: Vec<(ItemId, ItemRecord)> = fields
            .into_iter()
            .map(|field| (field.item, ItemRecord::fetched(field.mime, field.value)))
            .collect();
        if !records.iter().any(|(id, _)| *id == item) {
            let node = ItemRecord::fetched(PLACEHOLDER_NODE_MIME, Vec::<u8>::new());
            records.push((item, node));
        }

        for (id, record) in records {
            if let Err(e) = store.put_item(&subject, &id, &record).await {
                tracing::error!(%subject, item = %id, error = %e, "Failed to store fetched item");
            }
            listing.insert(id.to_string(), PermissionEntry::from_record(&record));
        }
    }

    Ok(listing)
}

/// Fields of a successful fetch, `None` when it was rejected or not sent.
async fn fetch(
    multiplexer: &Multiplexer,
    item: ItemId,
    subject: SubjectKey,
) -> Option<Vec<FetchedField>> {
    let result = match multiplexer.submit(item, subject).await {
        Ok(handle) => handle.collect().await,
        Err(e) => Err(e),
    };
    match result {
        Ok(fields) => Some(fields),
        Err(e) => {
            tracing::warn!(%subject, %item, error = %e, "Fetch of granted item failed");
            None
        }
    }
}
