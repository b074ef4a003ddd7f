//! proxyu-gateway binary

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proxyu_gateway::{
    backend::{AuthorityBackend, GrpcBackend},
    config::GatewayArgs,
    flows::{PairingFlow, PermissionFlow, PermissionPolicy},
    multiplexer::{DispatchContext, Multiplexer, MultiplexerTasks},
    schema::SchemaGraph,
    server::{create_router, AppState},
    store::{ItemStore, SqliteStore},
};

/// Everything `main` needs once startup succeeded
struct Gateway {
    state: AppState,
    tasks: MultiplexerTasks,
    sqlite: SqliteStore,
    listener: TcpListener,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proxyu_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = GatewayArgs::parse();
    info!(proxyu = %args.proxyu, process = %args.process, "Starting ProxyU gateway");

    let shutdown = CancellationToken::new();
    let gateway = build(&args, shutdown.clone())
        .await
        .context("gateway startup failed")?;

    // Open event streams only end once their flows are cancelled, so the
    // token fires before the server waits for connections to close.
    let server_shutdown = shutdown.clone();
    axum::serve(gateway.listener, create_router(gateway.state))
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = shutdown_signal() => {}
                _ = server_shutdown.cancelled() => info!("Data stream ended, shutting down"),
            }
            server_shutdown.cancel();
        })
        .await
        .context("HTTP server failed")?;

    shutdown.cancel();
    if tokio::time::timeout(args.shutdown_grace(), gateway.tasks.join())
        .await
        .is_err()
    {
        info!("Data stream did not drain within the grace period");
    }

    gateway.sqlite.close().await;
    info!("Gateway stopped");
    Ok(())
}

async fn build(args: &GatewayArgs, shutdown: CancellationToken) -> proxyu_gateway::Result<Gateway> {
    let schema = SchemaGraph::from_file(&args.dag)?;
    info!(path = %args.dag.display(), nodes = schema.len(), "Schema loaded");
    let schema = Arc::new(schema);

    let sqlite = SqliteStore::open(&args.userdata).await?;
    info!(path = %args.userdata.display(), "Store opened");
    let store: Arc<dyn ItemStore> = Arc::new(sqlite.clone());

    let tls = args.tls();
    let backend: Arc<dyn AuthorityBackend> =
        Arc::new(GrpcBackend::connect(&args.proxyu, tls.as_ref()).await?);

    let (multiplexer, tasks) = Multiplexer::spawn(
        backend.clone(),
        DispatchContext {
            store: store.clone(),
            schema: schema.clone(),
        },
        args.process,
        args.multiplex_settings(),
        shutdown.clone(),
    );

    let state = AppState {
        store: store.clone(),
        schema,
        multiplexer,
        pairing: PairingFlow::new(backend.clone(), store.clone(), args.event_capacity),
        permission: PermissionFlow::new(
            backend,
            store,
            args.process,
            PermissionPolicy::default(),
            args.event_capacity,
        ),
        shutdown,
    };

    let addr = args.listen_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    Ok(Gateway {
        state,
        tasks,
        sqlite,
        listener,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
