//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use lobbyhub_api::AppState;
use lobbyhub_core::config::AppConfig;

const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Test server context
pub struct TestApp {
    /// Bound address
    pub addr: SocketAddr,
    /// Shared state, for inspecting the registry
    pub state: AppState,
}

impl TestApp {
    /// Start a server with a one-second sweep interval
    pub async fn spawn() -> Self {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.relay.sweep_interval_seconds = 1;

        let state = AppState::new(config);
        let _reaper = state.relay.spawn_reaper();
        let app = lobbyhub_api::build_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server");
        });

        Self { addr, state }
    }

    /// Connect a WebSocket client with the raw query string
    pub async fn connect_query(&self, query: &str) -> TestClient {
        let url = format!("ws://{}/ws?{}", self.addr, query);
        let (ws, _) = connect_async(url).await.expect("WebSocket connect");
        TestClient { ws }
    }

    /// Connect a WebSocket client to a lobby
    pub async fn connect(&self, lobby: &str) -> TestClient {
        self.connect_query(&format!("lobby={lobby}")).await
    }

    /// Plain HTTP GET returning the parsed JSON body
    pub async fn get_json(&self, path: &str) -> serde_json::Value {
        let mut stream = TcpStream::connect(self.addr).await.expect("tcp connect");
        let request = format!(
            "GET {path} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.addr
        );
        tokio::io::AsyncWriteExt::write_all(&mut stream, request.as_bytes())
            .await
            .expect("write request");

        let mut raw = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut stream, &mut raw)
            .await
            .expect("read response");
        let raw = String::from_utf8(raw).expect("utf8 response");
        let (_, body) = raw.split_once("\r\n\r\n").expect("http body");
        serde_json::from_str(body).expect("json body")
    }
}

/// A WebSocket client connected to the test server
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Send a text frame
    pub async fn send_text(&mut self, text: &str) {
        self.ws.send(Message::text(text)).await.expect("send text");
    }

    /// Send a binary frame
    pub async fn send_binary(&mut self, data: Vec<u8>) {
        self.ws.send(Message::binary(data)).await.expect("send binary");
    }

    /// Next text frame, skipping control frames
    pub async fn recv_text(&mut self) -> String {
        loop {
            let next = tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("timed out waiting for a frame");
            match next {
                Some(Ok(Message::Text(text))) => return text.as_str().to_owned(),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                other => panic!("expected text frame, got {other:?}"),
            }
        }
    }

    /// Assert the server closes the channel next
    pub async fn expect_closed(&mut self) {
        loop {
            let next = tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("timed out waiting for close");
            match next {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                other => panic!("expected close, got {other:?}"),
            }
        }
    }

    /// Assert nothing arrives for `window`
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(next) = tokio::time::timeout(window, self.ws.next()).await {
            panic!("expected silence, got {next:?}");
        }
    }

    /// Close the connection cleanly
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

/// Poll `check` until it holds or `limit` elapses
pub async fn eventually(limit: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    check()
}
