//! Write side of the data stream

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::proto::DataRequest;

/// Drain the outbound queue onto the wire until shutdown or a closed wire.
///
/// Returning drops this task's wire sender; once the reader drops its own the
/// exchange is half-closed.
pub(crate) async fn run_writer(
    mut outbound: mpsc::Receiver<DataRequest>,
    wire: mpsc::Sender<DataRequest>,
    shutdown: CancellationToken,
) {
    loop {
        let request = tokio::select! {
            _ = shutdown.cancelled() => break,
            request = outbound.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        if wire.send(request).await.is_err() {
            tracing::error!("Data stream write failed");
            shutdown.cancel();
            break;
        }
    }
    tracing::debug!("Data stream writer stopped");
}
