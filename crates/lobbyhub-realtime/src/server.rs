//! Top-level relay engine that ties together all subsystems.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use lobbyhub_core::config::RelayConfig;

use crate::connection::handle::ConnectionHandle;
use crate::error::RelayError;
use crate::frame::{InboundFrame, OutboundFrame};
use crate::lobby::registry::LobbyRegistry;
use crate::metrics::RelayMetrics;
use crate::reaper::Reaper;
use crate::session::Session;

/// Central relay engine shared by every connection.
#[derive(Clone)]
pub struct RelayEngine {
    /// Lobby registry.
    pub registry: Arc<LobbyRegistry>,
    /// Metrics collector.
    pub metrics: Arc<RelayMetrics>,
    /// Relay configuration.
    config: RelayConfig,
    /// When the engine was created.
    started_at: Instant,
    /// Shutdown signal sender.
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl std::fmt::Debug for RelayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayEngine")
            .field("lobbies", &self.registry.len())
            .finish()
    }
}

impl RelayEngine {
    /// Creates a new relay engine with an empty registry.
    pub fn new(config: RelayConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        let metrics = Arc::new(RelayMetrics::new());
        let registry = Arc::new(LobbyRegistry::new(Arc::clone(&metrics)));

        info!(
            sweep_interval_seconds = config.sweep_interval_seconds,
            channel_buffer_size = config.channel_capacity(),
            "Relay engine initialized"
        );

        Self {
            registry,
            metrics,
            config,
            started_at: Instant::now(),
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Time since the engine was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Registers a new connection.
    ///
    /// Returns its handle and the receiver the transport's writer must
    /// drain into the channel.
    pub fn open_connection(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundFrame>) {
        self.metrics.connection_opened();
        ConnectionHandle::new(self.config.channel_capacity())
    }

    /// Binds a connection to its lobby and runs its session to completion.
    ///
    /// Returns the reason the connection ended; `Ok(())` means shutdown.
    pub async fn serve_connection<S, E>(
        &self,
        handle: Arc<ConnectionHandle>,
        raw_lobby_id: Option<&str>,
        inbound: S,
    ) -> Result<(), RelayError>
    where
        S: Stream<Item = Result<InboundFrame, E>>,
        E: std::fmt::Display,
    {
        let result = match Session::bind(
            &self.registry,
            Arc::clone(&self.metrics),
            raw_lobby_id,
            handle,
        ) {
            Ok(session) => session.run(inbound, self.shutdown_receiver()).await,
            Err(err) => Err(err),
        };

        self.metrics.connection_closed();
        result
    }

    /// Spawns the reaper on the current runtime.
    pub fn spawn_reaper(&self) -> JoinHandle<()> {
        let reaper = Reaper::new(Arc::clone(&self.registry), self.config.sweep_interval());
        let shutdown = self.shutdown_receiver();
        tokio::spawn(async move { reaper.run(shutdown).await })
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Signals every session and the reaper to stop.
    pub fn shutdown(&self) {
        info!("Shutting down relay engine");
        self.shutdown_tx.send_replace(true);
    }

    /// Whether shutdown has been signalled.
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }
}
