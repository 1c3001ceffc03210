// Signal handling module
//
// The server stops on an interrupt (Ctrl+C / SIGINT) only; no other signal is handled.

use crate::logger;

/// Resolve when the process receives an interrupt.
///
/// If the interrupt handler cannot be installed the error is logged and the
/// future never resolves, leaving the server running.
pub async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}
