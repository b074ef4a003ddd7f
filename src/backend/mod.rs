//! Connection to the ProxyU authority
//!
//! Everything that talks to the authority goes through [`AuthorityBackend`].
//! The gRPC implementation lives in [`grpc`]; tests substitute an in-process
//! fake driven by channels.

mod grpc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_stream::wrappers::ReceiverStream;

use crate::proto::{
    CorrelationResponse, DataRequest, DataResponse, PermissionRequest, PermissionResponse,
};

pub use grpc::{GrpcBackend, TlsPaths};

/// Stream of messages pushed by the authority on one exchange
pub type BackendStream<T> = BoxStream<'static, Result<T, tonic::Status>>;

/// Errors opening or running an exchange with the authority
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
    #[error("rpc failed: {0}")]
    Status(#[from] tonic::Status),
    #[error("failed to read TLS material {path}: {source}")]
    Credentials {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid endpoint '{0}'")]
    Endpoint(String),
}

/// The three streaming exchanges offered by the authority.
///
/// Implementations must be Send + Sync; one instance is shared by every
/// connection task.
#[async_trait]
pub trait AuthorityBackend: Send + Sync {
    /// Open a pairing exchange. The stream yields informational messages and
    /// finally the subject public key.
    async fn correlation(&self) -> Result<BackendStream<CorrelationResponse>, BackendError>;

    /// Open a permission exchange for one item.
    async fn permission(
        &self,
        request: PermissionRequest,
    ) -> Result<BackendStream<PermissionResponse>, BackendError>;

    /// Open the process-wide data exchange. `outbound` carries everything the
    /// gateway writes; the returned stream carries everything it reads.
    /// Dropping every sender of `outbound` half-closes the exchange.
    async fn data(
        &self,
        outbound: ReceiverStream<DataRequest>,
    ) -> Result<BackendStream<DataResponse>, BackendError>;
}
