// @generated
/// Generated client implementations.
pub mod proxy_u_integration_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;
    /// Service exposed by the ProxyU authority to integrating gateways.
    #[derive(Debug, Clone)]
    pub struct ProxyUIntegrationClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl ProxyUIntegrationClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> ProxyUIntegrationClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        /// Pairs a browser session with a subject key.
        pub async fn correlation(
            &mut self,
            request: impl tonic::IntoRequest<super::CorrelationRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::CorrelationResponse>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/proxyu.ProxyUIntegration/Correlation",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("proxyu.ProxyUIntegration", "Correlation"));
            self.inner.server_streaming(req, path, codec).await
        }
        /// Requests a grant decision for one data item.
        pub async fn permission(
            &mut self,
            request: impl tonic::IntoRequest<super::PermissionRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::PermissionResponse>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/proxyu.ProxyUIntegration/Permission",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("proxyu.ProxyUIntegration", "Permission"));
            self.inner.server_streaming(req, path, codec).await
        }
        /// Long-lived data exchange, one per gateway process.
        pub async fn data(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::DataRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::DataResponse>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/proxyu.ProxyUIntegration/Data",
            );
            let mut req = request.into_streaming_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("proxyu.ProxyUIntegration", "Data"));
            self.inner.streaming(req, path, codec).await
        }
    }
}
