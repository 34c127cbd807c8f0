// Server loop module
// Accepts connections until shutdown is signalled, then drains open ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often open connections are polled while draining
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the accept loop until `state.shutdown_signal` fires.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = state.shutdown_signal.notified() => break,
        }
    }

    // Stop accepting before draining
    drop(listener);
    logger::log_shutdown(active_connections.load(Ordering::SeqCst));

    let grace = Duration::from_secs(state.config.performance.shutdown_timeout);
    let drained = tokio::time::timeout(grace, async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    })
    .await;

    match drained {
        Ok(()) => logger::log_info("All connections closed"),
        Err(_) => logger::log_warning(&format!(
            "{} connections still open after {}s, exiting",
            active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        )),
    }
}
