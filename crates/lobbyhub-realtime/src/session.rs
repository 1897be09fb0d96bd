//! Connection session: binds one channel to a lobby slot and relays.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::connection::handle::ConnectionHandle;
use crate::error::RelayError;
use crate::frame::{Frame, InboundFrame};
use crate::lobby::lobby::Lobby;
use crate::lobby::registry::LobbyRegistry;
use crate::lobby::types::{LobbyId, Role};
use crate::metrics::RelayMetrics;
use crate::shutdown::wait_for_shutdown;

/// The live binding between one connection and a lobby slot.
///
/// A session only exists once a slot has been occupied; rejected
/// connections never produce one.
#[derive(Debug)]
pub struct Session {
    lobby: Arc<Lobby>,
    role: Role,
    handle: Arc<ConnectionHandle>,
    metrics: Arc<RelayMetrics>,
}

impl Session {
    /// Parse the lobby ID, resolve the lobby and occupy a slot.
    ///
    /// On failure the matching error frame is queued and the channel is
    /// closed before the error is returned.
    pub fn bind(
        registry: &LobbyRegistry,
        metrics: Arc<RelayMetrics>,
        raw_lobby_id: Option<&str>,
        handle: Arc<ConnectionHandle>,
    ) -> Result<Self, RelayError> {
        let joined = LobbyId::parse(raw_lobby_id)
            .and_then(|id| registry.join(id, Arc::clone(&handle)));

        let (lobby, role) = match joined {
            Ok(bound) => bound,
            Err(err) => {
                metrics.connection_rejected(err);
                info!(
                    conn_id = %handle.id,
                    lobby = raw_lobby_id.unwrap_or_default(),
                    error = %err,
                    "Connection rejected"
                );
                handle.reject(err);
                return Err(err);
            }
        };

        info!(
            conn_id = %handle.id,
            lobby_id = %lobby.id(),
            role = %role,
            "Session bound to lobby"
        );

        Ok(Self {
            lobby,
            role,
            handle,
            metrics,
        })
    }

    /// The lobby this session occupies.
    pub fn lobby(&self) -> &Arc<Lobby> {
        &self.lobby
    }

    /// The slot this session occupies.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Run the relay loop until the channel ends, a protocol violation
    /// occurs, or shutdown is signalled.
    ///
    /// - stream end or error: slot released, opponent sent `4|0`
    /// - non-text frame: `9|Packet Error` to the sender, slot released
    ///   without notifying the opponent
    /// - text frame: forwarded verbatim to the opponent, then `4|1` back
    ///   to the sender; dropped if there is no opponent
    /// - eviction (outbound buffer full): handled like a disconnect
    /// - shutdown: handled like a disconnect, returns `Ok(())`
    ///
    /// The channel is closed on every exit path.
    pub async fn run<S, E>(
        self,
        inbound: S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), RelayError>
    where
        S: Stream<Item = Result<InboundFrame, E>>,
        E: std::fmt::Display,
    {
        let mut inbound = std::pin::pin!(inbound);

        loop {
            let next = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => {
                    debug!(conn_id = %self.handle.id, "Session stopped by shutdown");
                    self.release(true);
                    self.handle.close();
                    return Ok(());
                }
                _ = self.handle.evicted() => {
                    warn!(
                        conn_id = %self.handle.id,
                        lobby_id = %self.lobby.id(),
                        "Client stopped reading, dropping session"
                    );
                    self.metrics.eviction();
                    return Err(self.disconnect());
                }
                next = inbound.next() => next,
            };

            match next {
                Some(Ok(InboundFrame::Text(payload))) => {
                    if self.lobby.relay(self.role, payload) {
                        self.metrics.payload_relayed();
                    } else {
                        self.metrics.payload_dropped();
                    }
                }
                Some(Ok(InboundFrame::Binary(data))) => {
                    warn!(
                        conn_id = %self.handle.id,
                        lobby_id = %self.lobby.id(),
                        len = data.len(),
                        "Non-text frame received, closing session"
                    );
                    self.metrics.protocol_violation();
                    let err = RelayError::ProtocolViolation;
                    if let Some(message) = err.wire_message() {
                        self.handle.send_frame(Frame::error(message));
                    }
                    self.release(false);
                    self.handle.close();
                    return Err(err);
                }
                Some(Err(e)) => {
                    debug!(conn_id = %self.handle.id, error = %e, "Channel receive failed");
                    return Err(self.disconnect());
                }
                None => return Err(self.disconnect()),
            }
        }
    }

    fn disconnect(&self) -> RelayError {
        self.metrics.disconnect();
        self.release(true);
        self.handle.close();
        RelayError::PeerDisconnect
    }

    fn release(&self, notify: bool) {
        self.lobby.leave(self.role, self.handle.id, notify);
        info!(
            conn_id = %self.handle.id,
            lobby_id = %self.lobby.id(),
            role = %self.role,
            notify,
            "Session released slot"
        );
    }
}
