//! Admin API for process-wide log level control.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::middleware::LoggerBinding;
use crate::logging::LoggerRegistry;

/// State shared by the admin routes.
#[derive(Clone)]
pub struct AdminState {
    pub registry: LoggerRegistry,
    pub api_key: Arc<str>,
    pub binding: Arc<ArcSwap<LoggerBinding>>,
}

impl AdminState {
    pub fn new(
        registry: LoggerRegistry,
        api_key: &str,
        binding: Arc<ArcSwap<LoggerBinding>>,
    ) -> Self {
        Self {
            registry,
            api_key: Arc::from(api_key),
            binding,
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/log-levels", get(list_levels))
        .route("/admin/log-levels/{subsystem}", put(set_level))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{MemorySink, Severity};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    const KEY: &str = "test-key";

    fn setup() -> (Router, AdminState) {
        let registry = LoggerRegistry::new(Arc::new(MemorySink::new()));
        registry.get_logger("nexus", Severity::Info);
        let binding = Arc::new(ArcSwap::from_pointee(LoggerBinding::new("nexus", Severity::Info)));
        let state = AdminState::new(registry, KEY, binding);
        (setup_admin_router(state.clone()), state)
    }

    fn put_level(subsystem: &str, body: &str, key: &str) -> Request<Body> {
        Request::put(format!("/admin/log-levels/{}", subsystem))
            .header(header::AUTHORIZATION, format!("Bearer {}", key))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_requires_token() {
        let (router, _) = setup();
        let res = router
            .clone()
            .oneshot(Request::get("/admin/log-levels").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = router
            .oneshot(put_level("nexus", r#"{"level":"debug"}"#, "wrong"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_levels() {
        let (router, _) = setup();
        let res = router
            .oneshot(
                Request::get("/admin/log-levels")
                    .header(header::AUTHORIZATION, format!("Bearer {}", KEY))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let entries: Vec<LevelEntry> = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            entries,
            vec![LevelEntry {
                subsystem: "nexus".into(),
                level: Severity::Info
            }]
        );
    }

    #[tokio::test]
    async fn test_set_level_updates_registry_and_binding() {
        let (router, state) = setup();
        let res = router
            .oneshot(put_level("nexus", r#"{"level":"warn"}"#, KEY))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            state.registry.get_logger("nexus", Severity::Debug).level(),
            Severity::Warn
        );
        assert_eq!(state.binding.load().level, Severity::Warn);
    }

    #[tokio::test]
    async fn test_set_level_rejects_bad_input() {
        let (router, _) = setup();
        let res = router
            .clone()
            .oneshot(put_level("nexus", r#"{"level":"shouty"}"#, KEY))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = router
            .oneshot(put_level("missing", r#"{"level":"info"}"#, KEY))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
