//! Periodic removal of empty lobbies.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::lobby::registry::LobbyRegistry;
use crate::shutdown::wait_for_shutdown;

/// Background sweeper for the lobby registry.
///
/// Reclamation is eventual: a lobby that empties is removed by the next
/// sweep, never synchronously by the session that left it.
#[derive(Debug, Clone)]
pub struct Reaper {
    /// Registry to sweep
    registry: Arc<LobbyRegistry>,
    /// Time between sweeps
    interval: Duration,
}

impl Reaper {
    /// Create a new reaper
    pub fn new(registry: Arc<LobbyRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Sweep every interval until the shutdown signal is received.
    ///
    /// The first sweep runs one full interval after start.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval = ?self.interval, "Lobby reaper started");

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => break,
                _ = ticker.tick() => {
                    self.sweep_once();
                }
            }
        }

        tracing::info!("Lobby reaper stopped");
    }

    /// Run a single sweep, returning the number of lobbies removed.
    pub fn sweep_once(&self) -> usize {
        let removed = self.registry.sweep();
        if removed > 0 {
            tracing::info!(
                removed,
                remaining = self.registry.len(),
                "Reaped empty lobbies"
            );
        } else {
            tracing::trace!("Reaper sweep found no empty lobbies");
        }
        removed
    }
}
