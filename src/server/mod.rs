//! HTTP boundary
//!
//! ## Endpoints
//!
//! - `GET /api/login`            - Ensure the browser cookie, report pairing state
//! - `GET /api/auth`             - SSE pairing stream (`Login` events)
//! - `GET /api/request/:id`      - SSE permission stream for one item (`Permission` events)
//! - `GET /api/dag`              - Schema definition
//! - `GET /api/user/permissions` - Items held for the paired subject

mod error;
mod routes;

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::flows::{PairingFlow, PermissionFlow};
use crate::multiplexer::Multiplexer;
use crate::schema::SchemaGraph;
use crate::store::ItemStore;

pub use error::{ApiError, ErrorResponse};
pub use routes::{LoginStatus, SESSION_COOKIE};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub schema: Arc<SchemaGraph>,
    pub multiplexer: Multiplexer,
    pub pairing: PairingFlow,
    pub permission: PermissionFlow,
    /// Parent of every flow token; cancelled on process shutdown
    pub shutdown: CancellationToken,
}

/// Build the gateway router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/login", get(routes::login))
        .route("/api/auth", get(routes::auth_events))
        .route("/api/request/:id", get(routes::permission_events))
        .route("/api/dag", get(routes::schema_definition))
        .route("/api/user/permissions", get(routes::user_permissions))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
