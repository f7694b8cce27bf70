//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, Request},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;

use request_logger::config::ServiceConfig;
use request_logger::logging::{LoggerRegistry, MemorySink};

/// Correlation header values seen by the mock upstream, one per call.
pub type SeenIds = Arc<Mutex<Vec<Option<String>>>>;

/// Start a mock upstream on an ephemeral port that records the
/// `x-request-id` of every call and answers 200.
pub async fn start_mock_upstream() -> (SocketAddr, SeenIds) {
    async fn data(State(seen): State<SeenIds>, headers: HeaderMap) -> &'static str {
        let id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.lock().unwrap().push(id);
        "upstream data"
    }

    let seen: SeenIds = Arc::default();
    let app = Router::new()
        .route("/data", get(data))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, seen)
}

/// Start an upstream that accepts connections and never answers.
pub async fn start_silent_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// A URL nothing listens on.
pub fn unreachable_upstream() -> String {
    "http://127.0.0.1:1/data".to_string()
}

/// Config pointing the demo route at `upstream_url`.
pub fn test_config(upstream_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.url = upstream_url.to_string();
    config.upstream.timeout_secs = 2;
    config
}

/// An isolated registry capturing records in memory.
pub fn memory_registry() -> (LoggerRegistry, MemorySink) {
    let sink = MemorySink::new();
    (LoggerRegistry::new(Arc::new(sink.clone())), sink)
}

/// GET `path`, optionally carrying an `x-request-id`.
pub fn get_request(path: &str, request_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(path);
    if let Some(id) = request_id {
        builder = builder.header("x-request-id", id);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
