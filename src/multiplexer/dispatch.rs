//! Read side of the data stream
//!
//! Every inbound message is handled here, in arrival order, by one task.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use super::correlation::{CorrelationTable, DeliverySender};
use super::{Delivery, FetchedField};
use crate::backend::{AuthorityBackend, BackendStream};
use crate::proto::{
    data_request, data_response, DataDeleteRequest, DataDeleteResponse, DataField, DataRequest,
    DataResponse, DataRetrieveRequest, DataRetrieveResponse, DataSupplyRequest,
};
use crate::schema::SchemaGraph;
use crate::store::ItemStore;
use crate::types::{CorrelationKey, ItemId, ItemRecord, SubjectKey};

/// Payload answered for an item the store does not hold
pub const PLACEHOLDER_VALUE: &[u8] = b"NONE";

/// Type tag of a missing primary item
pub const PLACEHOLDER_NODE_MIME: &str = "application/datau+node";

/// Type tag of a missing child field
pub const PLACEHOLDER_FIELD_MIME: &str = "text/plain; charset=UTF-8";

/// Error code acknowledging a push that was applied
const ACK_OK: u32 = 0;

/// Error code for a push that could not be applied
const ACK_FAILED: u32 = 1;

/// What the reader needs to answer authority-initiated pushes
#[derive(Clone)]
pub struct DispatchContext {
    pub store: Arc<dyn ItemStore>,
    pub schema: Arc<SchemaGraph>,
}

/// Open the data exchange, then dispatch until it ends.
pub(crate) async fn run_reader(
    backend: Arc<dyn AuthorityBackend>,
    wire_rx: mpsc::Receiver<DataRequest>,
    wire_tx: mpsc::Sender<DataRequest>,
    table: Arc<CorrelationTable>,
    context: DispatchContext,
    delivery_timeout: Duration,
    shutdown: CancellationToken,
) {
    let opened = tokio::select! {
        _ = shutdown.cancelled() => {
            table.close_all().await;
            return;
        }
        opened = backend.data(ReceiverStream::new(wire_rx)) => opened,
    };

    let inbound = match opened {
        Ok(inbound) => inbound,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open data stream");
            shutdown.cancel();
            table.close_all().await;
            return;
        }
    };
    tracing::info!("Data stream open");

    let mut dispatcher = Dispatcher {
        wire: Some(wire_tx),
        table: table.clone(),
        context,
        delivery_timeout,
        shutdown: shutdown.clone(),
    };
    dispatcher.run(inbound).await;

    shutdown.cancel();
    let dropped = table.close_all().await;
    if dropped > 0 {
        tracing::warn!(dropped, "Closed pending retrieves after data stream ended");
    }
}

struct Dispatcher {
    /// `None` once writing has stopped; pushes read while draining go unanswered
    wire: Option<mpsc::Sender<DataRequest>>,
    table: Arc<CorrelationTable>,
    context: DispatchContext,
    /// Bound on waiting for a slow waiter; inbound dispatch is stalled meanwhile
    delivery_timeout: Duration,
    shutdown: CancellationToken,
}

impl Dispatcher {
    async fn run(&mut self, mut inbound: BackendStream<DataResponse>) {
        loop {
            let next = if self.wire.is_none() {
                inbound.next().await
            } else {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        tracing::info!("Closing data stream for writing, draining");
                        self.wire = None;
                        continue;
                    }
                    next = inbound.next() => next,
                }
            };

            match next {
                None => {
                    tracing::info!("ProxyU closed the data stream");
                    return;
                }
                Some(Err(status)) => {
                    tracing::error!(code = ?status.code(), message = %status.message(), "Data stream failed");
                    return;
                }
                Some(Ok(message)) => self.handle(message).await,
            }
        }
    }

    async fn handle(&mut self, message: DataResponse) {
        match message.response {
            Some(data_response::Response::RetrieveResponse(response)) => {
                self.on_retrieve_response(response).await
            }
            Some(data_response::Response::RetrieveRequest(request)) => {
                self.on_retrieve_request(request).await
            }
            Some(data_response::Response::SupplyRequest(request)) => {
                self.on_supply_request(request).await
            }
            Some(data_response::Response::DeleteRequest(request)) => {
                self.on_delete_request(request).await
            }
            None => tracing::warn!("Data message without payload"),
        }
    }

    async fn on_retrieve_response(&self, response: DataRetrieveResponse) {
        let key = match CorrelationKey::from_wire(&response.public_key, &response.data) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(error = %e, "Retrieve response with malformed key");
                return;
            }
        };

        let Some(waiter) = self.table.take(&key).await else {
            tracing::warn!(%key, "Retrieve response without a pending request");
            return;
        };

        if response.error != ACK_OK {
            tracing::info!(%key, code = response.error, "Retrieve rejected");
            self.deliver(
                &key,
                &waiter,
                Delivery::Rejected {
                    code: response.error,
                },
            )
            .await;
            return;
        }

        for field in response.fields {
            let item = match ItemId::from_slice(&field.uuid) {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!(%key, error = %e, "Skipping field with malformed identifier");
                    continue;
                }
            };
            let delivery = Delivery::Field(FetchedField {
                item,
                mime: field.mime,
                value: field.value,
            });
            if !self.deliver(&key, &waiter, delivery).await {
                return;
            }
        }
        self.deliver(&key, &waiter, Delivery::Complete).await;
    }

    /// Hand one delivery to a waiter. Returns false once the waiter is gone
    /// or too slow; dropping it then closes its queue.
    async fn deliver(
        &self,
        key: &CorrelationKey,
        waiter: &DeliverySender,
        delivery: Delivery,
    ) -> bool {
        match waiter.send_timeout(delivery, self.delivery_timeout).await {
            Ok(()) => true,
            Err(SendTimeoutError::Closed(_)) => {
                tracing::debug!(%key, "Retrieve waiter went away");
                false
            }
            Err(SendTimeoutError::Timeout(_)) => {
                tracing::warn!(%key, "Retrieve waiter stalled, dropping it");
                false
            }
        }
    }

    async fn on_retrieve_request(&mut self, request: DataRetrieveRequest) {
        let key = match CorrelationKey::from_wire(&request.public_key, &request.data) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(error = %e, "Retrieve request with malformed key");
                let reply = DataRetrieveResponse {
                    public_key: request.public_key,
                    data: request.data,
                    process: request.process,
                    error: ACK_FAILED,
                    fields: Vec::new(),
                };
                self.send(data_request::Request::RetrieveResponse(reply)).await;
                return;
            }
        };

        if self.lookup(&key.subject, &key.item).await.is_none() {
            tracing::info!(
                %key,
                placeholder_mime = PLACEHOLDER_NODE_MIME,
                "Requested item not stored"
            );
        }

        let mut fields = Vec::new();
        for child in self.context.schema.children(&key.item) {
            let (mime, value) = match self.lookup(&key.subject, child).await {
                Some(record) => (record.mime, record.payload),
                None => (
                    PLACEHOLDER_FIELD_MIME.to_string(),
                    PLACEHOLDER_VALUE.to_vec(),
                ),
            };
            fields.push(DataField {
                uuid: child.to_vec(),
                mime,
                value,
            });
        }

        tracing::debug!(%key, fields = fields.len(), "Answering retrieve request");
        let reply = DataRetrieveResponse {
            public_key: request.public_key,
            data: request.data,
            process: request.process,
            error: ACK_OK,
            fields,
        };
        self.send(data_request::Request::RetrieveResponse(reply)).await;
    }

    async fn on_supply_request(&self, request: DataSupplyRequest) {
        let key = match CorrelationKey::from_wire(&request.public_key, &request.data) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(error = %e, "Supply request with malformed key");
                return;
            }
        };

        let record = ItemRecord::fetched(request.mime, request.value);
        match self
            .context
            .store
            .put_item(&key.subject, &key.item, &record)
            .await
        {
            Ok(()) => tracing::debug!(%key, mime = %record.mime, "Stored supplied item"),
            Err(e) => tracing::error!(%key, error = %e, "Failed to store supplied item"),
        }
    }

    async fn on_delete_request(&mut self, request: DataDeleteRequest) {
        let error = match CorrelationKey::from_wire(&request.public_key, &request.data) {
            Ok(key) => match self.context.store.delete_item(&key.subject, &key.item).await {
                Ok(existed) => {
                    tracing::info!(%key, existed, "Deleted item on request");
                    ACK_OK
                }
                Err(e) => {
                    tracing::error!(%key, error = %e, "Failed to delete item");
                    ACK_FAILED
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Delete request with malformed key");
                ACK_FAILED
            }
        };

        let reply = DataDeleteResponse {
            public_key: request.public_key,
            data: request.data,
            error,
        };
        self.send(data_request::Request::DeleteResponse(reply)).await;
    }

    async fn lookup(&self, subject: &SubjectKey, item: &ItemId) -> Option<ItemRecord> {
        match self.context.store.get_item(subject, item).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(%subject, %item, error = %e, "Store lookup failed");
                None
            }
        }
    }

    async fn send(&mut self, request: data_request::Request) {
        let Some(wire) = &self.wire else {
            tracing::debug!("Data stream closed for writing, reply dropped");
            return;
        };
        let message = DataRequest {
            request: Some(request),
        };
        if wire.send(message).await.is_err() {
            tracing::error!("Data stream write failed");
            self.wire = None;
            self.shutdown.cancel();
        }
    }
}
