//! Correlation identifiers through the full middleware stack.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{http::HeaderMap, http::HeaderName, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use request_logger::context::RequestContext;
use request_logger::http::middleware::{correlation_middleware, CorrelationState, LoggerBinding};
use request_logger::http::{HttpServer, RequestLog};
use request_logger::logging::{FieldValue, Severity};

mod common;

async fn probe(headers: HeaderMap, ctx: RequestContext, log: RequestLog) -> Json<Value> {
    let first = headers.get("x-request-id").and_then(|v| v.to_str().ok());
    let second = headers.get("x-request-id").and_then(|v| v.to_str().ok());
    Json(json!({
        "first": first,
        "second": second,
        "context": ctx.correlation_id(),
        "logger": log.correlation_id(),
        "level": log.level(),
    }))
}

fn probe_router(level: Severity) -> Router {
    let (registry, _) = common::memory_registry();
    let state = CorrelationState::new(
        registry,
        HeaderName::from_static("x-request-id"),
        Arc::new(ArcSwap::from_pointee(LoggerBinding::new("nexus", level))),
    );
    Router::new()
        .route("/probe", get(probe))
        .layer(middleware::from_fn_with_state(state, correlation_middleware))
}

#[tokio::test]
async fn test_inbound_header_reused() {
    let res = probe_router(Severity::Info)
        .oneshot(common::get_request("/probe", Some("abc-123")))
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&common::body_string(res).await).unwrap();
    assert_eq!(body["logger"], "abc-123");
    assert_eq!(body["context"], "abc-123");
    assert_eq!(body["first"], "abc-123");
    assert_eq!(body["level"], "INFO");
}

#[tokio::test]
async fn test_missing_header_generated_and_visible() {
    let res = probe_router(Severity::Debug)
        .oneshot(common::get_request("/probe", None))
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&common::body_string(res).await).unwrap();

    let id = body["logger"].as_str().unwrap();
    assert!(!id.is_empty());
    assert!(Uuid::parse_str(id).is_ok());
    assert_eq!(body["first"], id);
    assert_eq!(body["second"], id);
    assert_eq!(body["context"], id);
}

#[tokio::test]
async fn test_handler_without_middleware_falls_back() {
    let router = Router::new().route("/probe", get(probe));
    let res = router
        .oneshot(common::get_request("/probe", Some("ignored")))
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&common::body_string(res).await).unwrap();
    assert_eq!(body["logger"], Value::Null);
    assert_eq!(body["context"], Value::Null);
}

#[tokio::test]
async fn test_demo_route_records_carry_inbound_id() {
    let (upstream, seen) = common::start_mock_upstream().await;
    let (registry, sink) = common::memory_registry();
    let config = common::test_config(&format!("http://{}/data", upstream));
    let server = HttpServer::with_registry(config, registry).unwrap();

    let res = server
        .router()
        .oneshot(common::get_request("/", Some("abc-123")))
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("x-request-id").unwrap(), "abc-123");
    assert_eq!(
        common::body_string(res).await,
        "API calls and custom function completed"
    );

    let records = sink.records();
    assert_eq!(records.len(), 6);
    assert!(records
        .iter()
        .all(|r| r.correlation_id.as_deref() == Some("abc-123")));

    let responses: Vec<_> = records
        .iter()
        .filter(|r| r.severity == Severity::Debug)
        .collect();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0].message, "API response: 200");
    assert_eq!(responses[2].fields.get("iter"), Some(&FieldValue::Int(2)));

    let nested: Vec<_> = records
        .iter()
        .filter(|r| r.message == "Custom function processing data")
        .collect();
    assert_eq!(nested.len(), 3);
    assert_eq!(
        nested[0].fields.get("custom_key"),
        Some(&FieldValue::Str("customValue".into()))
    );

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec![Some("abc-123".to_string()); 3]);
}

#[tokio::test]
async fn test_generated_id_echoed_on_response() {
    let (upstream, seen) = common::start_mock_upstream().await;
    let (registry, sink) = common::memory_registry();
    let config = common::test_config(&format!("http://{}/data", upstream));
    let server = HttpServer::with_registry(config, registry).unwrap();

    let res = server
        .router()
        .oneshot(common::get_request("/", None))
        .await
        .unwrap();

    let id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(Uuid::parse_str(&id).is_ok());
    assert_eq!(sink.records_for(&id).len(), 6);
    assert!(seen
        .lock()
        .unwrap()
        .iter()
        .all(|s| s.as_deref() == Some(id.as_str())));
}

#[tokio::test]
async fn test_configured_threshold_suppresses_debug() {
    let (upstream, _) = common::start_mock_upstream().await;
    let (registry, sink) = common::memory_registry();
    let mut config = common::test_config(&format!("http://{}/data", upstream));
    config.logging.level = "INFO".into();
    let server = HttpServer::with_registry(config, registry).unwrap();

    server
        .router()
        .oneshot(common::get_request("/", Some("quiet")))
        .await
        .unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.severity == Severity::Info));
}

#[tokio::test]
async fn test_upstream_failure_logged_not_raised() {
    let (registry, sink) = common::memory_registry();
    let config = common::test_config(&common::unreachable_upstream());
    let server = HttpServer::with_registry(config, registry).unwrap();

    let res = server
        .router()
        .oneshot(common::get_request("/", Some("failing")))
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let errors: Vec<_> = sink
        .records()
        .into_iter()
        .filter(|r| r.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 3);
    for (i, record) in errors.iter().enumerate() {
        assert!(record.message.starts_with("API call failed: request to"));
        assert_eq!(record.correlation_id.as_deref(), Some("failing"));
        assert_eq!(record.fields.get("iter"), Some(&FieldValue::Int(i as i64)));
        assert!(matches!(record.fields.get("err"), Some(FieldValue::Error(_))));
        assert!(matches!(record.fields.get("unique_id"), Some(FieldValue::Str(_))));
    }
}

#[tokio::test]
async fn test_timeout_response_carries_correlation_header() {
    let upstream = common::start_silent_upstream().await;
    let (registry, _) = common::memory_registry();
    let mut config = common::test_config(&format!("http://{}/data", upstream));
    config.upstream.timeout_secs = 30;
    config.timeouts.request_secs = 1;
    let server = HttpServer::with_registry(config, registry).unwrap();

    let res = server
        .router()
        .oneshot(common::get_request("/", Some("slow-1")))
        .await
        .unwrap();
    assert_eq!(res.status(), 408);
    assert_eq!(res.headers().get("x-request-id").unwrap(), "slow-1");

    let res = server
        .router()
        .oneshot(common::get_request("/", None))
        .await
        .unwrap();
    assert_eq!(res.status(), 408);
    let id = res.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_utf8_inbound_id_reaches_logger() {
    let res = probe_router(Severity::Info)
        .oneshot(
            axum::http::Request::get("/probe")
                .header("x-request-id", axum::http::HeaderValue::from_bytes("réq-1".as_bytes()).unwrap())
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&common::body_string(res).await).unwrap();
    assert_eq!(body["logger"], "réq-1");
    assert_eq!(body["context"], "réq-1");
}
