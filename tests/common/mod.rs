//! Shared fixtures: a channel-driven authority and a wired-up gateway

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::{ReceiverStream, UnboundedReceiverStream};
use tokio_util::sync::CancellationToken;
use tonic::Status;
use uuid::Uuid;

use proxyu_gateway::backend::{AuthorityBackend, BackendError, BackendStream};
use proxyu_gateway::flows::{PairingFlow, PermissionFlow, PermissionPolicy};
use proxyu_gateway::multiplexer::{
    DispatchContext, MultiplexSettings, Multiplexer, MultiplexerTasks,
};
use proxyu_gateway::proto::{
    data_request, data_response, CorrelationResponse, DataDeleteRequest, DataField, DataRequest,
    DataResponse, DataRetrieveRequest, DataRetrieveResponse, DataSupplyRequest, PermissionRequest,
    PermissionResponse,
};
use proxyu_gateway::schema::SchemaGraph;
use proxyu_gateway::server::{create_router, AppState};
use proxyu_gateway::store::{ItemStore, MemoryStore};
use proxyu_gateway::types::{ItemId, SubjectKey};

pub const PROCESS: Uuid = Uuid::from_u128(0xd31572a0_3799_4391_b3ac_149537a29b38);

pub const PASSPORT: &str = "c4a0e0f6-9a2b-4c61-8e41-2f6d2b0c9a11";
pub const FIRST_NAME: &str = "ab493ade-2f3f-11eb-a11b-23fff9ac0d99";
pub const LAST_NAME: &str = "9e2d8a71-3c4b-4e5f-8a6b-7c8d9e0f1a2b";

const WAIT: Duration = Duration::from_secs(5);

pub fn schema() -> SchemaGraph {
    let yaml = format!(
        r#"
didgraph:
  - key: "{PASSPORT}"
    mime: "application/datau+node"
    description: "Passport"
    children: ["{FIRST_NAME}", "{LAST_NAME}"]
  - key: "{FIRST_NAME}"
    mime: "text/plain; charset=UTF-8"
    description: "First name"
  - key: "{LAST_NAME}"
    mime: "text/plain; charset=UTF-8"
    description: "Last name"
"#
    );
    SchemaGraph::from_yaml(&yaml).unwrap()
}

pub fn subject(fill: u8) -> SubjectKey {
    SubjectKey::new([fill; 32])
}

pub fn item(text: &str) -> ItemId {
    ItemId::parse(text).unwrap()
}

/// Await `future`, failing the test if it takes too long.
pub async fn within<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(WAIT, future)
        .await
        .expect("timed out waiting")
}

type Push<T> = mpsc::UnboundedSender<Result<T, Status>>;

/// Backend whose exchanges are handed to the test through channels
pub struct FakeBackend {
    data_inbound: Mutex<Option<mpsc::UnboundedReceiver<Result<DataResponse, Status>>>>,
    data_opened: mpsc::UnboundedSender<ReceiverStream<DataRequest>>,
    correlations: mpsc::UnboundedSender<Push<CorrelationResponse>>,
    permissions: mpsc::UnboundedSender<(PermissionRequest, Push<PermissionResponse>)>,
}

/// Test side of a [`FakeBackend`]
pub struct FakeAuthority {
    /// Messages the authority pushes on the data stream
    pub data: Push<DataResponse>,
    data_opened: mpsc::UnboundedReceiver<ReceiverStream<DataRequest>>,
    correlations: mpsc::UnboundedReceiver<Push<CorrelationResponse>>,
    permissions: mpsc::UnboundedReceiver<(PermissionRequest, Push<PermissionResponse>)>,
}

impl FakeBackend {
    pub fn new() -> (Arc<Self>, FakeAuthority) {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();
        let (correlations_tx, correlations_rx) = mpsc::unbounded_channel();
        let (permissions_tx, permissions_rx) = mpsc::unbounded_channel();

        let backend = Arc::new(Self {
            data_inbound: Mutex::new(Some(data_rx)),
            data_opened: opened_tx,
            correlations: correlations_tx,
            permissions: permissions_tx,
        });
        let authority = FakeAuthority {
            data: data_tx,
            data_opened: opened_rx,
            correlations: correlations_rx,
            permissions: permissions_rx,
        };
        (backend, authority)
    }
}

#[async_trait]
impl AuthorityBackend for FakeBackend {
    async fn correlation(&self) -> Result<BackendStream<CorrelationResponse>, BackendError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.correlations
            .send(tx)
            .map_err(|_| BackendError::Status(Status::unavailable("authority gone")))?;
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    async fn permission(
        &self,
        request: PermissionRequest,
    ) -> Result<BackendStream<PermissionResponse>, BackendError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.permissions
            .send((request, tx))
            .map_err(|_| BackendError::Status(Status::unavailable("authority gone")))?;
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    async fn data(
        &self,
        outbound: ReceiverStream<DataRequest>,
    ) -> Result<BackendStream<DataResponse>, BackendError> {
        let inbound = self
            .data_inbound
            .lock()
            .await
            .take()
            .ok_or_else(|| BackendError::Status(Status::already_exists("data stream open")))?;
        let _ = self.data_opened.send(outbound);
        Ok(UnboundedReceiverStream::new(inbound).boxed())
    }
}

impl FakeAuthority {
    /// The gateway's side of the data stream, once it has been opened
    pub async fn wire(&mut self) -> ReceiverStream<DataRequest> {
        within(self.data_opened.recv())
            .await
            .expect("data stream never opened")
    }

    /// Next pairing exchange opened by the gateway
    pub async fn correlation(&mut self) -> Push<CorrelationResponse> {
        within(self.correlations.recv())
            .await
            .expect("no pairing exchange")
    }

    /// Next permission exchange opened by the gateway
    pub async fn permission(&mut self) -> (PermissionRequest, Push<PermissionResponse>) {
        within(self.permissions.recv())
            .await
            .expect("no permission exchange")
    }

    pub fn push(&self, response: data_response::Response) {
        self.data
            .send(Ok(DataResponse {
                response: Some(response),
            }))
            .expect("data stream closed");
    }

    pub fn push_retrieve_response(
        &self,
        subject: SubjectKey,
        item: ItemId,
        error: u32,
        fields: Vec<DataField>,
    ) {
        self.push(data_response::Response::RetrieveResponse(
            DataRetrieveResponse {
                public_key: subject.to_vec(),
                data: item.to_vec(),
                process: PROCESS.as_bytes().to_vec(),
                error,
                fields,
            },
        ));
    }

    pub fn push_retrieve_request(&self, subject: SubjectKey, item: ItemId) {
        self.push(data_response::Response::RetrieveRequest(DataRetrieveRequest {
            public_key: subject.to_vec(),
            data: item.to_vec(),
            process: PROCESS.as_bytes().to_vec(),
        }));
    }

    pub fn push_supply(&self, subject: SubjectKey, item: ItemId, mime: &str, value: &[u8]) {
        self.push(data_response::Response::SupplyRequest(DataSupplyRequest {
            public_key: subject.to_vec(),
            data: item.to_vec(),
            process: PROCESS.as_bytes().to_vec(),
            mime: mime.to_string(),
            value: value.to_vec(),
        }));
    }

    pub fn push_delete(&self, subject: SubjectKey, item: ItemId) {
        self.push(data_response::Response::DeleteRequest(DataDeleteRequest {
            public_key: subject.to_vec(),
            data: item.to_vec(),
            process: PROCESS.as_bytes().to_vec(),
        }));
    }
}

/// Next message the gateway wrote on the data stream
pub async fn next_request(wire: &mut ReceiverStream<DataRequest>) -> data_request::Request {
    within(wire.next())
        .await
        .expect("data stream closed")
        .request
        .expect("empty data request")
}

pub fn field(id: ItemId, mime: &str, value: &[u8]) -> DataField {
    DataField {
        uuid: id.to_vec(),
        mime: mime.to_string(),
        value: value.to_vec(),
    }
}

/// A gateway wired to a fake authority and an in-memory store
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub authority: FakeAuthority,
    pub multiplexer: Multiplexer,
    pub tasks: MultiplexerTasks,
    pub pairing: PairingFlow,
    pub permission: PermissionFlow,
    pub shutdown: CancellationToken,
    pub schema: Arc<SchemaGraph>,
}

impl Harness {
    pub fn start() -> Self {
        Self::with_settings(MultiplexSettings::default())
    }

    pub fn with_settings(settings: MultiplexSettings) -> Self {
        let (backend, authority) = FakeBackend::new();
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn ItemStore> = store.clone();
        let dyn_backend: Arc<dyn AuthorityBackend> = backend;
        let schema = Arc::new(schema());
        let shutdown = CancellationToken::new();

        let (multiplexer, tasks) = Multiplexer::spawn(
            dyn_backend.clone(),
            DispatchContext {
                store: dyn_store.clone(),
                schema: schema.clone(),
            },
            PROCESS,
            settings,
            shutdown.clone(),
        );

        Self {
            pairing: PairingFlow::new(dyn_backend.clone(), dyn_store.clone(), 8),
            permission: PermissionFlow::new(
                dyn_backend,
                dyn_store,
                PROCESS,
                PermissionPolicy::default(),
                8,
            ),
            store,
            authority,
            multiplexer,
            tasks,
            shutdown,
            schema,
        }
    }

    pub fn router(&self) -> axum::Router {
        create_router(AppState {
            store: self.store.clone(),
            schema: self.schema.clone(),
            multiplexer: self.multiplexer.clone(),
            pairing: self.pairing.clone(),
            permission: self.permission.clone(),
            shutdown: self.shutdown.clone(),
        })
    }
}
