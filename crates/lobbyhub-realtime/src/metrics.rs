//! Relay engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Total connections accepted by the transport
    pub connections_total: AtomicU64,
    /// Connections currently open
    pub connections_active: AtomicU64,
    /// Lobbies created on first use
    pub lobbies_created: AtomicU64,
    /// Lobbies removed by the reaper
    pub lobbies_reaped: AtomicU64,
    /// Payloads forwarded to an opponent
    pub payloads_relayed: AtomicU64,
    /// Payloads dropped for lack of an opponent
    pub payloads_dropped: AtomicU64,
    /// Connections rejected with an invalid lobby ID
    pub rejected_invalid_id: AtomicU64,
    /// Connections rejected because the lobby was full
    pub rejected_full: AtomicU64,
    /// Sessions ended by a non-text frame
    pub protocol_violations: AtomicU64,
    /// Sessions ended by channel closure
    pub disconnects: AtomicU64,
    /// Connections dropped for not draining their outbound buffer
    pub evictions: AtomicU64,
}

impl RelayMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted connection
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a closed connection
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Record a lobby created on first use
    pub fn lobby_created(&self) {
        self.lobbies_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record lobbies removed by one sweep
    pub fn lobbies_reaped(&self, count: usize) {
        self.lobbies_reaped.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a payload forwarded to an opponent
    pub fn payload_relayed(&self) {
        self.payloads_relayed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a payload with nowhere to go
    pub fn payload_dropped(&self) {
        self.payloads_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection refused before binding to a slot
    pub fn connection_rejected(&self, err: RelayError) {
        let counter = match err {
            RelayError::InvalidLobbyId => &self.rejected_invalid_id,
            RelayError::LobbyFull => &self.rejected_full,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session ended by a non-text frame
    pub fn protocol_violation(&self) {
        self.protocol_violations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session ended by channel closure
    pub fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection evicted for a full outbound buffer
    pub fn eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            lobbies_created: self.lobbies_created.load(Ordering::Relaxed),
            lobbies_reaped: self.lobbies_reaped.load(Ordering::Relaxed),
            payloads_relayed: self.payloads_relayed.load(Ordering::Relaxed),
            payloads_dropped: self.payloads_dropped.load(Ordering::Relaxed),
            rejected_invalid_id: self.rejected_invalid_id.load(Ordering::Relaxed),
            rejected_full: self.rejected_full.load(Ordering::Relaxed),
            protocol_violations: self.protocol_violations.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total connections accepted
    pub connections_total: u64,
    /// Connections currently open
    pub connections_active: u64,
    /// Lobbies created
    pub lobbies_created: u64,
    /// Lobbies reaped
    pub lobbies_reaped: u64,
    /// Payloads relayed
    pub payloads_relayed: u64,
    /// Payloads dropped
    pub payloads_dropped: u64,
    /// Invalid lobby ID rejections
    pub rejected_invalid_id: u64,
    /// Lobby full rejections
    pub rejected_full: u64,
    /// Protocol violations
    pub protocol_violations: u64,
    /// Peer disconnects
    pub disconnects: u64,
    /// Slow connections evicted
    pub evictions: u64,
}
