//! Shutdown signal helpers shared by sessions and the reaper.

use tokio::sync::watch;

/// Resolves once the shutdown flag flips to `true`.
///
/// If the sender is dropped without ever signalling, this never resolves.
pub async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    let signalled = rx.wait_for(|stop| *stop).await.is_ok();
    if !signalled {
        std::future::pending::<()>().await;
    }
}
