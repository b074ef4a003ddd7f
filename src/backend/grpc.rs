//! tonic implementation of [`AuthorityBackend`]

use std::path::PathBuf;

use async_trait::async_trait;
use futures::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};

use super::{AuthorityBackend, BackendError, BackendStream};
use crate::proto::{
    CorrelationRequest, CorrelationResponse, DataRequest, DataResponse, PermissionRequest,
    PermissionResponse, ProxyUIntegrationClient,
};

/// Client certificate, key and CA root for mutual TLS
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub ca_cert: PathBuf,
}

impl TlsPaths {
    async fn load(&self) -> Result<ClientTlsConfig, BackendError> {
        let cert = read_pem(&self.cert).await?;
        let key = read_pem(&self.key).await?;
        let ca = read_pem(&self.ca_cert).await?;

        Ok(ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(ca))
            .identity(Identity::from_pem(cert, key)))
    }
}

async fn read_pem(path: &PathBuf) -> Result<Vec<u8>, BackendError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| BackendError::Credentials {
            path: path.display().to_string(),
            source,
        })
}

/// gRPC client for the ProxyU integration service
#[derive(Clone)]
pub struct GrpcBackend {
    client: ProxyUIntegrationClient<Channel>,
}

impl GrpcBackend {
    /// Connect to `address` (`host:port`). With `tls` set the connection uses
    /// mutual TLS and the host part is checked against the server
    /// certificate; without it the connection is plaintext.
    pub async fn connect(address: &str, tls: Option<&TlsPaths>) -> Result<Self, BackendError> {
        let scheme = if tls.is_some() { "https" } else { "http" };
        let mut endpoint = Endpoint::from_shared(format!("{}://{}", scheme, address))
            .map_err(|_| BackendError::Endpoint(address.to_string()))?;

        if let Some(paths) = tls {
            let host = address
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or(address);
            let config = paths.load().await?.domain_name(host.to_string());
            endpoint = endpoint.tls_config(config)?;
        }

        tracing::info!(%address, tls = tls.is_some(), "Connecting to ProxyU");
        let channel = endpoint.connect().await?;

        Ok(Self {
            client: ProxyUIntegrationClient::new(channel),
        })
    }
}

#[async_trait]
impl AuthorityBackend for GrpcBackend {
    async fn correlation(&self) -> Result<BackendStream<CorrelationResponse>, BackendError> {
        let response = self
            .client
            .clone()
            .correlation(CorrelationRequest {})
            .await?;
        Ok(response.into_inner().boxed())
    }

    async fn permission(
        &self,
        request: PermissionRequest,
    ) -> Result<BackendStream<PermissionResponse>, BackendError> {
        let response = self.client.clone().permission(request).await?;
        Ok(response.into_inner().boxed())
    }

    async fn data(
        &self,
        outbound: ReceiverStream<DataRequest>,
    ) -> Result<BackendStream<DataResponse>, BackendError> {
        let response = self.client.clone().data(outbound).await?;
        Ok(response.into_inner().boxed())
    }
}
