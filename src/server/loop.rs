// Server loop module
// Accepts connections until shutdown, then drains the ones in flight

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config;
use crate::logger;

/// Poll interval while waiting for connections to finish
const DRAIN_POLL: Duration = Duration::from_millis(100);

/// Accept connections until `signals` requests shutdown.
///
/// Must run inside a `LocalSet`: connections are served with `spawn_local`.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    active_connections: Arc<AtomicUsize>,
    signals: Arc<SignalHandler>,
) -> Result<(), Box<dyn std::error::Error>> {
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

            _ = signals.shutdown.notified() => break,
        }
    }

    // Stop accepting, then give in-flight requests until the connection
    // timeout to finish
    drop(listener);
    let grace = Duration::from_secs(std::cmp::max(
        state.config.performance.read_timeout,
        state.config.performance.write_timeout,
    ));
    let deadline = tokio::time::Instant::now() + grace;
    while active_connections.load(Ordering::SeqCst) > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(DRAIN_POLL).await;
    }

    let remaining = active_connections.load(Ordering::SeqCst);
    if remaining > 0 {
        logger::log_warning(&format!("Shutting down with {remaining} connection(s) still open"));
    }
    logger::log_info("Server stopped");
    Ok(())
}
