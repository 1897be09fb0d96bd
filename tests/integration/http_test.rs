//! Integration tests for the HTTP endpoints.

mod helpers;

use helpers::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::spawn().await;

    let body = app.get_json("/api/health").await;
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_stats_reflect_sessions() {
    let app = TestApp::spawn().await;
    let mut one = app.connect("11").await;
    let mut two = app.connect("11").await;
    one.recv_text().await;
    two.recv_text().await;

    let body = app.get_json("/api/stats").await;
    assert_eq!(body["data"]["lobbies"][0]["id"], 11);
    assert_eq!(body["data"]["lobbies"][0]["status"], "full");
    assert_eq!(body["data"]["metrics"]["connections_active"], 2);
}
