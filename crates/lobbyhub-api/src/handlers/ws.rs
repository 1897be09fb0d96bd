//! WebSocket upgrade handler.

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use lobbyhub_core::error::AppError;
use lobbyhub_realtime::connection::ConnectionId;
use lobbyhub_realtime::frame::{InboundFrame, OutboundFrame};

use crate::error::ApiError;
use crate::state::AppState;

/// Why the inbound side of a WebSocket ended.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The client sent a close frame.
    #[error("closed by peer")]
    Closed,
    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] axum::Error),
}

/// GET /ws?lobby={id}: WebSocket upgrade
///
/// The lobby ID is validated after the upgrade so that a malformed ID can
/// be reported over the socket itself.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    if state.relay.is_shutting_down() {
        return Err(AppError::service_unavailable("Server is shutting down").into());
    }

    let lobby = params.get(&state.config.relay.lobby_query_param).cloned();
    let ws = match state.config.relay.max_frame_bytes {
        Some(limit) => ws.max_message_size(limit),
        None => ws,
    };

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, lobby, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, lobby: Option<String>, socket: WebSocket) {
    let (ws_tx, ws_rx) = socket.split();

    let (handle, outbound_rx) = state.relay.open_connection();
    let conn_id = handle.id;

    info!(
        conn_id = %conn_id,
        lobby = lobby.as_deref().unwrap_or_default(),
        "WebSocket connection established"
    );

    let evicted = handle.eviction_token();
    let writer = tokio::spawn(forward_outbound(conn_id, outbound_rx, ws_tx, evicted));

    let result = state
        .relay
        .serve_connection(handle, lobby.as_deref(), inbound_frames(ws_rx))
        .await;

    // The writer exits after the queued close, on eviction, or once every
    // handle clone is gone and the queue is drained.
    let _ = writer.await;

    match result {
        Ok(()) => info!(conn_id = %conn_id, "WebSocket connection closed by shutdown"),
        Err(reason) => info!(conn_id = %conn_id, reason = %reason, "WebSocket connection closed"),
    }
}

/// Adapts axum messages into relay frames.
///
/// Ping and pong are answered by the transport and skipped. A close frame
/// ends the channel like a read error does.
fn inbound_frames<S>(ws_rx: S) -> impl Stream<Item = Result<InboundFrame, ChannelError>>
where
    S: Stream<Item = Result<Message, axum::Error>>,
{
    ws_rx.filter_map(|result| async move {
        match result {
            Ok(Message::Text(text)) => Some(Ok(InboundFrame::Text(text.as_str().to_owned()))),
            Ok(Message::Binary(data)) => Some(Ok(InboundFrame::Binary(data.to_vec()))),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => None,
            Ok(Message::Close(_)) => Some(Err(ChannelError::Closed)),
            Err(e) => Some(Err(ChannelError::Transport(e))),
        }
    })
}

/// Drains a connection's outbound queue into the socket. This is the only
/// task that writes to the socket.
///
/// Eviction abandons the queue and any write stuck on a client that has
/// stopped reading.
async fn forward_outbound(
    conn_id: ConnectionId,
    mut outbound_rx: mpsc::Receiver<OutboundFrame>,
    mut ws_tx: SplitSink<WebSocket, Message>,
    evicted: CancellationToken,
) {
    loop {
        let frame = tokio::select! {
            biased;
            _ = evicted.cancelled() => break,
            frame = outbound_rx.recv() => frame,
        };

        let (message, last) = match frame {
            Some(OutboundFrame::Text(text)) => (Message::Text(text.into()), false),
            Some(OutboundFrame::Close) => (Message::Close(None), true),
            None => break,
        };

        let sent = tokio::select! {
            biased;
            _ = evicted.cancelled() => break,
            sent = ws_tx.send(message) => sent,
        };
        if let Err(e) = sent {
            debug!(conn_id = %conn_id, error = %e, "WebSocket write failed");
            break;
        }
        if last {
            break;
        }
    }

    if evicted.is_cancelled() {
        debug!(conn_id = %conn_id, "Outbound writer abandoned after eviction");
        return;
    }

    let _ = ws_tx.close().await;
    debug!(conn_id = %conn_id, "Outbound writer finished");
}
