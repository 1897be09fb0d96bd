//! Lobby registry: maps lobby IDs to lobbies.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::handle::ConnectionHandle;
use crate::error::RelayError;
use crate::metrics::RelayMetrics;

use super::lobby::Lobby;
use super::types::{LobbyId, LobbyStatus, Role};

/// Registry of all live lobbies.
///
/// Creation and occupancy changes through [`LobbyRegistry::join`] run
/// under the map's shard lock for that ID, and [`LobbyRegistry::sweep`]
/// checks occupancy under the same lock before deleting. A lobby that
/// gains an occupant can therefore never be swept away beneath it.
#[derive(Debug)]
pub struct LobbyRegistry {
    /// Lobby ID → lobby.
    lobbies: DashMap<LobbyId, Arc<Lobby>>,
    /// Metrics.
    metrics: Arc<RelayMetrics>,
}

impl LobbyRegistry {
    /// Creates an empty registry.
    pub fn new(metrics: Arc<RelayMetrics>) -> Self {
        Self {
            lobbies: DashMap::new(),
            metrics,
        }
    }

    fn create(&self, id: LobbyId) -> Arc<Lobby> {
        self.metrics.lobby_created();
        debug!(lobby_id = %id, "Lobby created");
        Arc::new(Lobby::new(id))
    }

    /// Returns the lobby for `id`, creating an empty one if absent.
    pub fn resolve(&self, id: LobbyId) -> Arc<Lobby> {
        let entry = self
            .lobbies
            .entry(id)
            .or_insert_with(|| self.create(id));
        Arc::clone(entry.value())
    }

    /// Resolves the lobby for `id` and occupies a slot in it, atomically
    /// with respect to [`LobbyRegistry::sweep`].
    pub fn join(
        &self,
        id: LobbyId,
        handle: Arc<ConnectionHandle>,
    ) -> Result<(Arc<Lobby>, Role), RelayError> {
        let entry = self
            .lobbies
            .entry(id)
            .or_insert_with(|| self.create(id));
        let role = entry.value().join(handle)?;
        Ok((Arc::clone(entry.value()), role))
    }

    /// Looks up a lobby without creating it.
    pub fn get(&self, id: LobbyId) -> Option<Arc<Lobby>> {
        self.lobbies.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Removes every lobby whose slots are both empty.
    ///
    /// Returns the number of lobbies removed. Idempotent.
    pub fn sweep(&self) -> usize {
        let mut removed = 0usize;
        self.lobbies.retain(|id, lobby| {
            if lobby.is_vacant() {
                debug!(lobby_id = %id, "Lobby deleted");
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.metrics.lobbies_reaped(removed);
        }
        removed
    }

    /// Returns the number of lobbies.
    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    /// Whether no lobby exists.
    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }

    /// Returns the status of every lobby, ordered by ID.
    pub fn snapshot(&self) -> Vec<LobbySnapshot> {
        let mut lobbies: Vec<LobbySnapshot> = self
            .lobbies
            .iter()
            .map(|entry| {
                let lobby = entry.value();
                let occupants = lobby.occupants();
                LobbySnapshot {
                    id: *entry.key(),
                    status: LobbyStatus::from_occupants(occupants),
                    occupants,
                    created_at: lobby.created_at(),
                }
            })
            .collect();
        lobbies.sort_by_key(|l| l.id);
        lobbies
    }
}

/// Serializable view of one lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbySnapshot {
    /// Lobby ID
    pub id: LobbyId,
    /// Occupancy state
    pub status: LobbyStatus,
    /// Occupied slots
    pub occupants: usize,
    /// When the lobby was created
    pub created_at: DateTime<Utc>,
}
