//! Individual client connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use crate::error::RelayError;
use crate::frame::{Frame, OutboundFrame};

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A handle to a single client channel.
///
/// Every write to the channel goes through this handle's bounded FIFO
/// queue, which exactly one writer task drains. Writes issued by the owning
/// session and by the opponent's session therefore never interleave.
///
/// Enqueueing never waits, so it is safe while holding a lobby lock. A
/// client that stops reading fills its queue; the next send then evicts
/// the connection instead of buffering without limit.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound frames
    sender: mpsc::Sender<OutboundFrame>,
    /// Cleared once a close is queued or the writer has gone away
    alive: AtomicBool,
    /// Cancelled when the outbound queue overflows
    evicted: CancellationToken,
}

impl ConnectionHandle {
    /// Create a new connection handle and the receiver its writer drains.
    pub fn new(capacity: usize) -> (Arc<Self>, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(capacity.max(2));
        let handle = Arc::new(Self {
            id: Uuid::new_v4(),
            connected_at: Utc::now(),
            sender: tx,
            alive: AtomicBool::new(true),
            evicted: CancellationToken::new(),
        });
        (handle, rx)
    }

    /// Queue an outbound frame. Returns `false` if the frame was not queued.
    pub fn send(&self, frame: OutboundFrame) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Outbound buffer full, evicting connection");
                self.evict();
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(conn_id = %self.id, "Writer gone, marking connection dead");
                self.mark_dead();
                false
            }
        }
    }

    /// Queue an application payload verbatim.
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.send(OutboundFrame::Text(text.into()))
    }

    /// Queue an encoded control frame.
    pub fn send_frame(&self, frame: Frame) -> bool {
        self.send(frame.into())
    }

    /// Queue a close. Later sends are refused.
    pub fn close(&self) {
        if self.is_alive() {
            if self.sender.try_send(OutboundFrame::Close).is_err() {
                self.evicted.cancel();
            }
            self.mark_dead();
        }
    }

    /// Queue the error frame for `err` (if it has one), then close.
    pub fn reject(&self, err: RelayError) {
        if let Some(message) = err.wire_message() {
            self.send_frame(Frame::error(message));
        }
        self.close();
    }

    /// Drop the connection without draining its queue.
    pub fn evict(&self) {
        self.mark_dead();
        self.evicted.cancel();
    }

    /// Whether the connection was evicted.
    pub fn is_evicted(&self) -> bool {
        self.evicted.is_cancelled()
    }

    /// Completes once the connection is evicted.
    pub fn evicted(&self) -> WaitForCancellationFuture<'_> {
        self.evicted.cancelled()
    }

    /// Token cancelled on eviction, for the writer task.
    pub fn eviction_token(&self) -> CancellationToken {
        self.evicted.clone()
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_queued_in_order() {
        let (handle, mut rx) = ConnectionHandle::new(8);
        assert!(handle.send_frame(Frame::joined()));
        assert!(handle.send_text("hello"));

        assert_eq!(rx.try_recv().ok(), Some(OutboundFrame::Text("4|1".into())));
        assert_eq!(rx.try_recv().ok(), Some(OutboundFrame::Text("hello".into())));
    }

    #[test]
    fn test_reject_sends_error_then_close() {
        let (handle, mut rx) = ConnectionHandle::new(8);
        handle.reject(RelayError::LobbyFull);

        assert_eq!(
            rx.try_recv().ok(),
            Some(OutboundFrame::Text("9|Lobby Full".into()))
        );
        assert_eq!(rx.try_recv().ok(), Some(OutboundFrame::Close));
        assert!(!handle.is_alive());
        assert!(!handle.send_text("late"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reject_fits_in_smallest_buffer() {
        let (handle, mut rx) = ConnectionHandle::new(0);
        handle.reject(RelayError::InvalidLobbyId);

        assert_eq!(
            rx.try_recv().ok(),
            Some(OutboundFrame::Text("9|Invalid Lobby ID".into()))
        );
        assert_eq!(rx.try_recv().ok(), Some(OutboundFrame::Close));
        assert!(!handle.is_evicted());
    }

    #[test]
    fn test_send_after_writer_dropped_marks_dead() {
        let (handle, rx) = ConnectionHandle::new(8);
        drop(rx);
        assert!(!handle.send_text("lost"));
        assert!(!handle.is_alive());
        assert!(!handle.is_evicted());
    }

    #[test]
    fn test_full_buffer_evicts_connection() {
        let (handle, mut rx) = ConnectionHandle::new(3);
        for i in 0..3 {
            assert!(handle.send_text(format!("payload {i}")));
        }

        assert!(!handle.send_text("one too many"));
        assert!(handle.is_evicted());
        assert!(!handle.is_alive());

        // Nothing further is queued once evicted.
        let _ = rx.try_recv();
        assert!(!handle.send_text("after eviction"));
        assert_eq!(
            rx.try_recv().ok(),
            Some(OutboundFrame::Text("payload 1".into()))
        );
        assert_eq!(
            rx.try_recv().ok(),
            Some(OutboundFrame::Text("payload 2".into()))
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_evicted_future_completes() {
        let (handle, _rx) = ConnectionHandle::new(2);
        let token = handle.eviction_token();

        handle.evict();

        handle.evicted().await;
        assert!(token.is_cancelled());
    }
}
