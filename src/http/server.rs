//! HTTP server setup and handlers.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, rate limiting)
//! - Serve the cached status and checker liveness
//! - Drain gracefully on the shutdown broadcast

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::cache::StatusCache;
use crate::checker::CheckerHealth;
use crate::config::AppConfig;
use crate::http::response::{HealthResponse, StatusResponse};
use crate::observability::metrics;
use crate::security::{client_key, RateLimiter, RateLimiterStats};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<StatusCache>,
    pub checker: Arc<CheckerHealth>,
    pub limiter: Arc<RateLimiter>,
    pub config: Arc<AppConfig>,
}

/// HTTP server for the unit monitor.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the shared subsystems.
    pub fn new(
        config: Arc<AppConfig>,
        cache: Arc<StatusCache>,
        checker: Arc<CheckerHealth>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        let state = AppState {
            cache,
            checker,
            limiter,
            config,
        };
        Self {
            router: build_router(state),
        }
    }

    /// Run the server until the shutdown broadcast fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.listener.request_timeout_secs);

    // Only the high-volume status endpoint is admission-controlled; the
    // watchdog and diagnostics endpoints stay reachable under abuse.
    let status_route = Router::new()
        .route("/status", get(status_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .merge(status_route)
        .route("/healthz", get(healthz_handler))
        .route("/admin/limiter", get(limiter_stats_handler))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Admission control for the status endpoint.
async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let key = client_key(request.headers(), addr);
    if state.limiter.allow(&key) {
        return next.run(request).await;
    }

    let wait = state.limiter.reserve(&key);
    let remaining = state.limiter.tokens(&key);
    tracing::warn!(client = %key, "Rate limit exceeded");
    metrics::record_rate_limited();
    metrics::record_request(429);

    let mut response = Response::new(Body::from("Rate limit exceeded"));
    *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
    let retry_after = wait.as_secs_f64().ceil().max(1.0) as u64;
    if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{}", remaining.floor() as u64)) {
        response
            .headers_mut()
            .insert("x-ratelimit-remaining", value);
    }
    response
}

/// Serve the cached unit status. The cached status code doubles as the
/// HTTP status of the response.
async fn status_handler(State(state): State<AppState>) -> Response {
    let (code, unit_state) = state.cache.status();
    let stale = state
        .cache
        .is_stale(state.config.monitor.staleness_threshold());
    let last_checked_seconds_ago = state
        .cache
        .last_checked()
        .map(|at| at.elapsed().as_secs_f64());

    if stale {
        tracing::warn!(
            unit = %state.config.monitor.unit,
            "Serving stale status"
        );
    }

    let body = StatusResponse {
        unit: state.config.monitor.unit.clone(),
        status_code: code,
        state: unit_state,
        cache_state: state.cache.cache_state(),
        last_checked_seconds_ago,
        stale,
    };

    metrics::record_request(code);
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

/// Checker liveness for an external watchdog. Distinguishes "unit is
/// down" (still 200 here) from "checker itself is stuck" (503 here).
async fn healthz_handler(State(state): State<AppState>) -> Response {
    let max_age = state.config.monitor.checker_max_age();
    let healthy = state.checker.is_healthy(max_age);
    let last_check_seconds_ago = state
        .checker
        .last_success()
        .map(|at| at.elapsed().as_secs_f64());

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    metrics::record_request(status.as_u16());

    (
        status,
        Json(HealthResponse {
            healthy,
            last_check_seconds_ago,
        }),
    )
        .into_response()
}

/// Diagnostic snapshot of the rate limiter.
async fn limiter_stats_handler(State(state): State<AppState>) -> Json<RateLimiterStats> {
    Json(state.limiter.stats())
}
