//! Data stream multiplexer
//!
//! One bidirectional `Data` exchange with the authority carries every
//! retrieve this gateway issues and every push the authority initiates.
//!
//! ```text
//!   submit() ──► correlation table ──► outbound queue ──► writer task ─┐
//!                      ▲                                              ▼
//!                      │                                        wire sender ──► ProxyU
//!                      │                                              ▲
//!   waiter ◄── delivery queue ◄── reader task (dispatch) ◄── inbound ◄┘
//!                                     │
//!                                     ├─ RetrieveRequest ──► store + schema ──► RetrieveResponse
//!                                     ├─ SupplyRequest   ──► store
//!                                     └─ DeleteRequest   ──► store ──► DeleteResponse
//! ```
//!
//! The reader is the only consumer of the inbound stream. The writer task
//! and the reader (for its answers to pushes) share the bounded wire sender.
//! When the stream ends or fails the reader cancels the process-wide token
//! and closes every pending delivery queue.

mod correlation;
mod dispatch;
mod writer;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::backend::AuthorityBackend;
use crate::proto::{data_request, DataRequest, DataRetrieveRequest};
use crate::types::{CorrelationKey, ItemId, SubjectKey};

use correlation::CorrelationTable;

pub use dispatch::{
    DispatchContext, PLACEHOLDER_FIELD_MIME, PLACEHOLDER_NODE_MIME, PLACEHOLDER_VALUE,
};

/// Errors surfaced to callers of [`Multiplexer::submit`]
#[derive(Debug, thiserror::Error)]
pub enum MultiplexError {
    #[error("a retrieve for {0} is already pending")]
    AlreadyPending(CorrelationKey),
    #[error("data stream is closed")]
    Closed,
    #[error("retrieve for {key} rejected with code {code}")]
    Rejected { key: CorrelationKey, code: u32 },
}

/// A field attached to a retrieve response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedField {
    pub item: ItemId,
    pub mime: String,
    pub value: Vec<u8>,
}

/// One message on a delivery queue. `Complete` and `Rejected` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Field(FetchedField),
    Complete,
    Rejected { code: u32 },
}

/// Receiving end of one submitted retrieve
pub struct RetrieveHandle {
    key: CorrelationKey,
    deliveries: mpsc::Receiver<Delivery>,
}

impl RetrieveHandle {
    pub fn key(&self) -> CorrelationKey {
        self.key
    }

    /// Next delivery, or `None` once the queue is closed.
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.deliveries.recv().await
    }

    /// Wait for the whole response.
    ///
    /// A queue that closes without a terminal delivery means the data stream
    /// went away and yields `Closed`.
    pub async fn collect(mut self) -> Result<Vec<FetchedField>, MultiplexError> {
        let mut fields = Vec::new();
        while let Some(delivery) = self.deliveries.recv().await {
            match delivery {
                Delivery::Field(field) => fields.push(field),
                Delivery::Complete => return Ok(fields),
                Delivery::Rejected { code } => {
                    return Err(MultiplexError::Rejected {
                        key: self.key,
                        code,
                    })
                }
            }
        }
        Err(MultiplexError::Closed)
    }
}

/// Queue sizes and delivery limits for the multiplexer
#[derive(Debug, Clone, Copy)]
pub struct MultiplexSettings {
    /// Capacity of the outbound queue and of the wire sender
    pub outbound_capacity: usize,
    /// Capacity of each delivery queue
    pub delivery_capacity: usize,
    /// How long the reader waits on a full delivery queue before it drops
    /// that waiter
    pub delivery_timeout: Duration,
}

impl Default for MultiplexSettings {
    fn default() -> Self {
        Self {
            outbound_capacity: 64,
            delivery_capacity: 32,
            delivery_timeout: Duration::from_secs(5),
        }
    }
}

/// Reader and writer tasks of a running multiplexer
pub struct MultiplexerTasks {
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl MultiplexerTasks {
    /// Wait for both tasks to finish.
    pub async fn join(self) {
        if let Err(e) = self.writer.await {
            tracing::error!(error = %e, "Data stream writer task failed");
        }
        if let Err(e) = self.reader.await {
            tracing::error!(error = %e, "Data stream reader task failed");
        }
    }

    pub fn abort(&self) {
        self.writer.abort();
        self.reader.abort();
    }
}

/// Handle used to issue retrieves over the shared data stream
#[derive(Clone)]
pub struct Multiplexer {
    table: Arc<CorrelationTable>,
    outbound: mpsc::Sender<DataRequest>,
    process: Uuid,
    delivery_capacity: usize,
    shutdown: CancellationToken,
}

impl Multiplexer {
    /// Open the data exchange and start the reader and writer tasks.
    ///
    /// The exchange is opened inside the reader task, so this returns
    /// immediately; requests submitted before the stream is up wait in the
    /// outbound queue. Failing to open the exchange cancels `shutdown`.
    pub fn spawn(
        backend: Arc<dyn AuthorityBackend>,
        context: DispatchContext,
        process: Uuid,
        settings: MultiplexSettings,
        shutdown: CancellationToken,
    ) -> (Self, MultiplexerTasks) {
        let capacity = settings.outbound_capacity.max(1);
        let (wire_tx, wire_rx) = mpsc::channel(capacity);
        let (outbound_tx, outbound_rx) = mpsc::channel(capacity);
        let table = Arc::new(CorrelationTable::new());

        let reader = tokio::spawn(dispatch::run_reader(
            backend,
            wire_rx,
            wire_tx.clone(),
            table.clone(),
            context,
            settings.delivery_timeout,
            shutdown.clone(),
        ));
        let writer = tokio::spawn(writer::run_writer(outbound_rx, wire_tx, shutdown.clone()));

        let multiplexer = Self {
            table,
            outbound: outbound_tx,
            process,
            delivery_capacity: settings.delivery_capacity,
            shutdown,
        };

        (multiplexer, MultiplexerTasks { reader, writer })
    }

    /// Ask the authority for `item` of `subject`.
    ///
    /// A slot in the outbound queue is reserved before the correlation is
    /// registered, and the request is queued right after without awaiting.
    /// Dropping this future therefore never leaves a registration behind for
    /// a request that was not sent, and the response can never overtake its
    /// registration.
    pub async fn submit(
        &self,
        item: ItemId,
        subject: SubjectKey,
    ) -> Result<RetrieveHandle, MultiplexError> {
        if self.shutdown.is_cancelled() {
            return Err(MultiplexError::Closed);
        }

        let permit = self
            .outbound
            .reserve()
            .await
            .map_err(|_| MultiplexError::Closed)?;

        let key = CorrelationKey::new(subject, item);
        let deliveries = self.table.register(key, self.delivery_capacity).await?;

        permit.send(DataRequest {
            request: Some(data_request::Request::RetrieveRequest(DataRetrieveRequest {
                public_key: subject.to_vec(),
                data: item.to_vec(),
                process: self.process.as_bytes().to_vec(),
            })),
        });

        tracing::debug!(%key, "Retrieve submitted");
        Ok(RetrieveHandle { key, deliveries })
    }

    /// Number of retrieves waiting for a response
    pub async fn pending(&self) -> usize {
        self.table.len().await
    }
}
