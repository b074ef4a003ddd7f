//! Permission: ask the subject to grant access to one item

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{emit, FlowHandle, FlowMessage, FlowOutcome, FlowStream};
use crate::backend::AuthorityBackend;
use crate::proto::permission_response::Response;
use crate::proto::PermissionRequest;
use crate::store::ItemStore;
use crate::types::{ItemId, ItemRecord, SubjectKey};

/// Usage terms attached to every permission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPolicy {
    pub reason: Uuid,
    pub policy: Vec<u8>,
    /// Validity window, Unix seconds
    pub from: u64,
    pub until: u64,
    pub amount: u32,
    pub level: u32,
}

const DEFAULT_REASON: Uuid = Uuid::from_u128(0x323fd1ea_76c7_4069_8fb1_d223f816c927);

/// Policy hash, `zqNzKjKy2SUf4SR+dGlLeBfHKaCWPBc6jKANOOM5XAY=` in base64
const DEFAULT_POLICY: [u8; 32] = [
    0xce, 0xa3, 0x73, 0x2a, 0x32, 0xb2, 0xd9, 0x25, 0x1f, 0xe1, 0x24, 0x7e, 0x74, 0x69, 0x4b, 0x78,
    0x17, 0xc7, 0x29, 0xa0, 0x96, 0x3c, 0x17, 0x3a, 0x8c, 0xa0, 0x0d, 0x38, 0xe3, 0x39, 0x5c, 0x06,
];

impl Default for PermissionPolicy {
    fn default() -> Self {
        Self {
            reason: DEFAULT_REASON,
            policy: DEFAULT_POLICY.to_vec(),
            from: 1_605_087_413,
            until: 1_893_456_000,
            amount: 0,
            level: 1,
        }
    }
}

impl PermissionPolicy {
    fn request(&self, process: Uuid, item: ItemId, subject: SubjectKey) -> PermissionRequest {
        PermissionRequest {
            process: process.as_bytes().to_vec(),
            data: item.to_vec(),
            public_key: subject.to_vec(),
            reason: self.reason.as_bytes().to_vec(),
            policy: self.policy.clone(),
            from: self.from,
            until: self.until,
            amount: self.amount,
            level: self.level,
        }
    }
}

/// Starts permission flows against the authority's permission exchange
#[derive(Clone)]
pub struct PermissionFlow {
    backend: Arc<dyn AuthorityBackend>,
    store: Arc<dyn ItemStore>,
    process: Uuid,
    policy: Arc<PermissionPolicy>,
    event_capacity: usize,
}

impl PermissionFlow {
    pub fn new(
        backend: Arc<dyn AuthorityBackend>,
        store: Arc<dyn ItemStore>,
        process: Uuid,
        policy: PermissionPolicy,
        event_capacity: usize,
    ) -> Self {
        Self {
            backend,
            store,
            process,
            policy: Arc::new(policy),
            event_capacity: event_capacity.max(1),
        }
    }

    /// Spawn a permission request for `item` on behalf of `subject`.
    pub fn start(
        &self,
        item: ItemId,
        subject: SubjectKey,
        parent: &CancellationToken,
    ) -> FlowHandle {
        let token = parent.child_token();
        let (tx, rx) = mpsc::channel(self.event_capacity);
        let request = self.policy.request(self.process, item, subject);

        let task = tokio::spawn(run(
            self.backend.clone(),
            self.store.clone(),
            request,
            item,
            subject,
            tx,
            token.clone(),
        ));

        FlowHandle {
            events: FlowStream::new(rx, token.drop_guard()),
            task,
        }
    }
}

async fn run(
    backend: Arc<dyn AuthorityBackend>,
    store: Arc<dyn ItemStore>,
    request: PermissionRequest,
    item: ItemId,
    subject: SubjectKey,
    events: mpsc::Sender<FlowMessage>,
    token: CancellationToken,
) -> FlowOutcome {
    let outcome = ask(backend, store, request, item, subject, &events, &token).await;
    match &outcome {
        FlowOutcome::Failed(reason) => tracing::warn!(%item, %subject, %reason, "Permission flow failed"),
        other => tracing::info!(%item, %subject, outcome = ?other, "Permission flow finished"),
    }
    outcome
}

async fn ask(
    backend: Arc<dyn AuthorityBackend>,
    store: Arc<dyn ItemStore>,
    request: PermissionRequest,
    item: ItemId,
    subject: SubjectKey,
    events: &mpsc::Sender<FlowMessage>,
    token: &CancellationToken,
) -> FlowOutcome {
    let opened = tokio::select! {
        _ = token.cancelled() => return FlowOutcome::Cancelled,
        opened = backend.permission(request) => opened,
    };
    let mut exchange = match opened {
        Ok(exchange) => exchange,
        Err(e) => return FlowOutcome::Failed(e.to_string()),
    };

    loop {
        let next = tokio::select! {
            _ = token.cancelled() => return FlowOutcome::Cancelled,
            next = exchange.next() => next,
        };

        match next {
            None => return FlowOutcome::Failed("exchange ended without a decision".to_string()),
            Some(Err(status)) => return FlowOutcome::Failed(status.message().to_string()),
            Some(Ok(message)) => match message.response {
                Some(Response::PermissionMessage(msg)) => {
                    if !emit(events, FlowMessage::progress(msg)).await {
                        return FlowOutcome::Cancelled;
                    }
                }
                Some(Response::Granted(true)) => {
                    if let Err(e) = store.put_item(&subject, &item, &ItemRecord::granted()).await {
                        return FlowOutcome::Failed(e.to_string());
                    }
                    emit(events, FlowMessage::done()).await;
                    return FlowOutcome::Granted;
                }
                Some(Response::Granted(false)) => {
                    emit(events, FlowMessage::denied()).await;
                    return FlowOutcome::Denied;
                }
                None => tracing::warn!(%item, "Permission message without payload"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    #[test]
    fn test_default_policy_constants() {
        let policy = PermissionPolicy::default();
        assert_eq!(
            BASE64.encode(&policy.policy),
            "zqNzKjKy2SUf4SR+dGlLeBfHKaCWPBc6jKANOOM5XAY="
        );
        assert_eq!(
            policy.reason.to_string(),
            "323fd1ea-76c7-4069-8fb1-d223f816c927"
        );
        assert_eq!(policy.amount, 0);
        assert_eq!(policy.level, 1);
    }

    #[test]
    fn test_request_carries_identifiers() {
        let process = Uuid::from_u128(0xd31572a0_3799_4391_b3ac_149537a29b38);
        let item = ItemId::from_uuid(Uuid::from_bytes([3; 16]));
        let subject = SubjectKey::new([4; 32]);

        let request = PermissionPolicy::default().request(process, item, subject);
        assert_eq!(request.process, process.as_bytes().to_vec());
        assert_eq!(request.data, vec![3; 16]);
        assert_eq!(request.public_key, vec![4; 32]);
        assert_eq!(request.from, 1_605_087_413);
        assert_eq!(request.until, 1_893_456_000);
    }
}
