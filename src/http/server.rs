//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (correlation, tracing, timeout, response echo)
//! - Apply configuration reloads to the logger binding
//! - Serve until shutdown

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    http::{HeaderName, Request},
    middleware,
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::PropagateRequestIdLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{setup_admin_router, AdminState};
use crate::config::ServiceConfig;
use crate::http::handlers::{fetch_handler, health, AppState};
use crate::http::middleware::{correlation_middleware, CorrelationState, LoggerBinding};
use crate::http::upstream::{UpstreamClient, UpstreamError};
use crate::logging::LoggerRegistry;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid correlation header name {0:?}")]
    InvalidHeader(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    registry: LoggerRegistry,
    binding: Arc<ArcSwap<LoggerBinding>>,
}

impl HttpServer {
    /// Create a server logging through the global registry.
    pub fn new(config: ServiceConfig) -> Result<Self, ServerError> {
        Self::with_registry(config, LoggerRegistry::global())
    }

    /// Create a server logging through `registry`.
    pub fn with_registry(config: ServiceConfig, registry: LoggerRegistry) -> Result<Self, ServerError> {
        let header = HeaderName::from_bytes(config.logging.request_id_header.as_bytes())
            .map_err(|_| ServerError::InvalidHeader(config.logging.request_id_header.clone()))?;
        let binding = Arc::new(ArcSwap::from_pointee(LoggerBinding::from_config(&config.logging)));

        // Register the request subsystem up front so it is visible to the
        // admin API before the first request.
        {
            let initial = binding.load();
            registry
                .get_logger(&initial.subsystem, initial.level)
                .set_level(initial.level);
        }

        let app_state = AppState {
            upstream: Arc::new(UpstreamClient::new(&config.upstream, header.clone())?),
            calls_per_request: config.upstream.calls_per_request,
        };
        let correlation = CorrelationState::new(registry.clone(), header, binding.clone());

        let admin = AdminState::new(registry.clone(), &config.admin.api_key, binding.clone());
        let router = Self::build_router(&config, app_state, correlation, admin);
        Ok(Self {
            router,
            config,
            registry,
            binding,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &ServiceConfig,
        state: AppState,
        correlation: CorrelationState,
        admin: AdminState,
    ) -> Router {
        let header = correlation.header().clone();
        let span_header = header.clone();

        let mut router = Router::new()
            .route("/", get(fetch_handler))
            .route("/health", get(health))
            .with_state(state);

        if config.admin.enabled {
            router = router.merge(setup_admin_router(admin));
        }

        // Request order: bind the correlation id, echo it (timeouts
        // included), bound the request, then trace it.
        router
            .layer(TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
                let correlation_id = request
                    .headers()
                    .get(&span_header)
                    .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    correlation_id = %correlation_id,
                )
            }))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(header))
            .layer(middleware::from_fn_with_state(correlation, correlation_middleware))
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Apply a reloaded configuration to the logger binding.
    ///
    /// Listener, header and upstream changes need a restart.
    pub fn apply_config(registry: &LoggerRegistry, binding: &ArcSwap<LoggerBinding>, config: &ServiceConfig) {
        let next = LoggerBinding::from_config(&config.logging);
        let previous = binding.swap(Arc::new(next.clone()));
        registry
            .get_logger(&next.subsystem, next.level)
            .set_level(next.level);
        if *previous != next {
            metrics::record_level_change(&next.subsystem);
            tracing::info!(
                subsystem = %next.subsystem,
                level = %next.level,
                "Logger binding updated"
            );
        }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let registry = self.registry.clone();
        let binding = self.binding.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                Self::apply_config(&registry, &binding, &config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
