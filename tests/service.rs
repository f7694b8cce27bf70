//! End-to-end over a real socket: echo, admin overrides, reload, shutdown.

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use request_logger::logging::Severity;
use request_logger::{HttpServer, Shutdown};

mod common;

const KEY: &str = "service-test-key";

#[tokio::test]
async fn test_serve_reload_and_shutdown() {
    let (upstream, _) = common::start_mock_upstream().await;
    let (registry, sink) = common::memory_registry();
    let mut config = common::test_config(&format!("http://{}/data", upstream));
    config.logging.level = "WARN".into();
    config.admin.enabled = true;
    config.admin.api_key = KEY.into();

    let server = HttpServer::with_registry(config.clone(), registry.clone()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let shutdown = Shutdown::new();
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(server.run(listener, updates_rx, shutdown.subscribe()));

    let client = reqwest::Client::new();

    // Response echoes the inbound id.
    let res = client
        .get(format!("{base}/health"))
        .header("x-request-id", "live-1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "live-1");
    assert_eq!(res.text().await.unwrap(), "ok");

    // WARN threshold: the demo route logs nothing.
    client.get(format!("{base}/")).send().await.unwrap();
    assert!(sink.is_empty());

    // Admin override to INFO takes effect for the next request.
    let res = client
        .put(format!("{base}/admin/log-levels/nexus"))
        .bearer_auth(KEY)
        .json(&serde_json::json!({ "level": "info" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    client
        .get(format!("{base}/"))
        .header("x-request-id", "live-2")
        .send()
        .await
        .unwrap();
    assert_eq!(sink.records_for("live-2").len(), 3);

    // Reloaded config lowers the threshold to DEBUG.
    config.logging.level = "DEBUG".into();
    updates_tx.send(config).unwrap();
    let mut applied = false;
    for _ in 0..50 {
        if registry.levels().contains(&("nexus".to_string(), Severity::Debug)) {
            applied = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(applied, "reload never reached the registry");
    client
        .get(format!("{base}/"))
        .header("x-request-id", "live-3")
        .send()
        .await
        .unwrap();
    assert_eq!(sink.records_for("live-3").len(), 6);

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
