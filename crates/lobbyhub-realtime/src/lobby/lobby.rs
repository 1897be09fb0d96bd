//! A single two-slot lobby and its state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::error::RelayError;
use crate::frame::Frame;

use super::types::{LobbyId, LobbyStatus, Role};

/// Occupant slots. Holds non-owning handles: each connection is owned by
/// its session, the lobby only uses the handle to relay and notify.
#[derive(Debug, Default)]
struct Slots {
    slot_a: Option<Arc<ConnectionHandle>>,
    slot_b: Option<Arc<ConnectionHandle>>,
}

impl Slots {
    fn get(&self, role: Role) -> Option<&Arc<ConnectionHandle>> {
        match role {
            Role::SlotA => self.slot_a.as_ref(),
            Role::SlotB => self.slot_b.as_ref(),
        }
    }

    fn get_mut(&mut self, role: Role) -> &mut Option<Arc<ConnectionHandle>> {
        match role {
            Role::SlotA => &mut self.slot_a,
            Role::SlotB => &mut self.slot_b,
        }
    }

    fn occupants(&self) -> usize {
        usize::from(self.slot_a.is_some()) + usize::from(self.slot_b.is_some())
    }
}

/// A rendezvous point holding up to two occupants.
///
/// All slot reads and writes, and every notification or relay that
/// depends on them, happen under one lock. Handles only enqueue, so the
/// lock is never held across a blocking write.
#[derive(Debug)]
pub struct Lobby {
    id: LobbyId,
    created_at: DateTime<Utc>,
    slots: Mutex<Slots>,
}

impl Lobby {
    /// Creates an empty lobby.
    pub fn new(id: LobbyId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            slots: Mutex::new(Slots::default()),
        }
    }

    /// Lobby ID
    pub fn id(&self) -> LobbyId {
        self.id
    }

    /// When this lobby was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current occupancy state.
    pub fn status(&self) -> LobbyStatus {
        LobbyStatus::from_occupants(self.occupants())
    }

    /// Number of occupied slots, always 0, 1 or 2.
    pub fn occupants(&self) -> usize {
        self.slots().occupants()
    }

    /// Whether both slots are empty.
    pub fn is_vacant(&self) -> bool {
        self.occupants() == 0
    }

    /// Occupy a free slot.
    ///
    /// Slot A is preferred when both are free. When this join fills the
    /// lobby, both occupants are sent `4|1` before the lock is released,
    /// so the notifications precede any payload relayed under this pairing.
    /// A full lobby is left untouched.
    pub fn join(&self, handle: Arc<ConnectionHandle>) -> Result<Role, RelayError> {
        let mut slots = self.slots();

        let role = if slots.slot_a.is_none() {
            Role::SlotA
        } else if slots.slot_b.is_none() {
            Role::SlotB
        } else {
            return Err(RelayError::LobbyFull);
        };

        *slots.get_mut(role) = Some(Arc::clone(&handle));

        if let Some(opponent) = slots.get(role.other()) {
            opponent.send_frame(Frame::joined());
            handle.send_frame(Frame::joined());
        }

        debug!(
            lobby_id = %self.id,
            conn_id = %handle.id,
            role = %role,
            occupants = slots.occupants(),
            "Joined lobby"
        );

        Ok(role)
    }

    /// Release the slot held by `conn_id`.
    ///
    /// When `notify` is set and the other slot is occupied, the opponent
    /// is sent exactly one `4|0`. Returns `false` if the slot was not held
    /// by that connection.
    pub fn leave(&self, role: Role, conn_id: ConnectionId, notify: bool) -> bool {
        let mut slots = self.slots();

        let slot = slots.get_mut(role);
        if slot.as_ref().map(|h| h.id) != Some(conn_id) {
            return false;
        }
        *slot = None;

        if notify {
            if let Some(opponent) = slots.get(role.other()) {
                opponent.send_frame(Frame::left());
            }
        }

        debug!(
            lobby_id = %self.id,
            conn_id = %conn_id,
            role = %role,
            notify,
            occupants = slots.occupants(),
            "Left lobby"
        );

        true
    }

    /// Forward `payload` from the occupant of `role` to its opponent.
    ///
    /// On success the sender is sent a `4|1` reaffirming the opponent is
    /// still connected. With no opponent, or an opponent that can no
    /// longer take frames, the payload is dropped and `false` is returned.
    pub fn relay(&self, role: Role, payload: String) -> bool {
        let slots = self.slots();

        let Some(opponent) = slots.get(role.other()) else {
            return false;
        };
        if !opponent.send_text(payload) {
            return false;
        }

        if let Some(sender) = slots.get(role) {
            sender.send_frame(Frame::joined());
        }

        true
    }
}
