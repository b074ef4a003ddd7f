//! Pairing: bind a browser to a subject key

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{emit, FlowHandle, FlowMessage, FlowOutcome, FlowStream};
use crate::backend::AuthorityBackend;
use crate::proto::correlation_response::Response;
use crate::store::ItemStore;
use crate::types::{BrowserId, SubjectKey};

/// Starts pairing flows against the authority's correlation exchange
#[derive(Clone)]
pub struct PairingFlow {
    backend: Arc<dyn AuthorityBackend>,
    store: Arc<dyn ItemStore>,
    event_capacity: usize,
}

impl PairingFlow {
    pub fn new(
        backend: Arc<dyn AuthorityBackend>,
        store: Arc<dyn ItemStore>,
        event_capacity: usize,
    ) -> Self {
        Self {
            backend,
            store,
            event_capacity: event_capacity.max(1),
        }
    }

    /// Spawn a pairing for `browser`. The flow stops when `parent` is
    /// cancelled or the returned event stream is dropped.
    pub fn start(&self, browser: BrowserId, parent: &CancellationToken) -> FlowHandle {
        let token = parent.child_token();
        let (tx, rx) = mpsc::channel(self.event_capacity);

        let task = tokio::spawn(run(
            self.backend.clone(),
            self.store.clone(),
            browser,
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
    browser: BrowserId,
    events: mpsc::Sender<FlowMessage>,
    token: CancellationToken,
) -> FlowOutcome {
    let outcome = pair(backend, store, browser, &events, &token).await;
    match &outcome {
        FlowOutcome::Failed(reason) => tracing::warn!(?browser, %reason, "Pairing failed"),
        other => tracing::info!(?browser, outcome = ?other, "Pairing finished"),
    }
    outcome
}

async fn pair(
    backend: Arc<dyn AuthorityBackend>,
    store: Arc<dyn ItemStore>,
    browser: BrowserId,
    events: &mpsc::Sender<FlowMessage>,
    token: &CancellationToken,
) -> FlowOutcome {
    let opened = tokio::select! {
        _ = token.cancelled() => return FlowOutcome::Cancelled,
        opened = backend.correlation() => opened,
    };
    let mut exchange = match opened {
        Ok(exchange) => exchange,
        Err(e) => return FlowOutcome::Failed(e.to_string()),
    };
    tracing::debug!(?browser, "Pairing exchange open");

    loop {
        let next = tokio::select! {
            _ = token.cancelled() => return FlowOutcome::Cancelled,
            next = exchange.next() => next,
        };

        match next {
            None => return FlowOutcome::Failed("exchange ended without a key".to_string()),
            Some(Err(status)) => return FlowOutcome::Failed(status.message().to_string()),
            Some(Ok(message)) => match message.response {
                Some(Response::CorrelationMessage(msg)) => {
                    if !emit(events, FlowMessage::progress(msg)).await {
                        return FlowOutcome::Cancelled;
                    }
                }
                Some(Response::PublicKey(raw)) => {
                    let subject = match SubjectKey::from_slice(&raw) {
                        Ok(subject) => subject,
                        Err(e) => return FlowOutcome::Failed(e.to_string()),
                    };
                    if let Err(e) = store.put_session(&browser, &subject).await {
                        return FlowOutcome::Failed(e.to_string());
                    }
                    emit(events, FlowMessage::done()).await;
                    return FlowOutcome::Bound;
                }
                None => tracing::warn!(?browser, "Correlation message without payload"),
            },
        }
    }
}
