//! Generated protobuf modules for the ProxyU integration service
//!
//! Checked in from `proto/proxyu/integration.proto` so the build does not
//! need `protoc`. Regenerate with tonic-build (client only) when the contract
//! changes.

pub mod proxyu {
    include!("proxyu.rs");

    // tonic-generated client code refers to the messages through `super::`
    include!("proxyu.tonic.rs");
}

// Re-export commonly used types for convenience
pub use proxyu::proxy_u_integration_client::ProxyUIntegrationClient;
pub use proxyu::{
    correlation_response, data_request, data_response, permission_response, CorrelationRequest,
    CorrelationResponse, DataDeleteRequest, DataDeleteResponse, DataField, DataRequest,
    DataResponse, DataRetrieveRequest, DataRetrieveResponse, DataSupplyRequest,
    PermissionRequest, PermissionResponse,
};
