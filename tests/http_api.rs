//! HTTP surface: status serving, checker health, rate limiting.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use unit_sentry::cache::StatusCache;
use unit_sentry::checker::CheckerHealth;
use unit_sentry::config::AppConfig;
use unit_sentry::http::server::{build_router, AppState};
use unit_sentry::security::RateLimiter;

struct TestApp {
    router: Router,
    cache: Arc<StatusCache>,
    checker: Arc<CheckerHealth>,
}

fn test_app(mutate: impl FnOnce(&mut AppConfig)) -> TestApp {
    let mut config = AppConfig::default();
    config.monitor.unit = "demo.service".to_string();
    mutate(&mut config);

    let cache = Arc::new(StatusCache::new());
    let checker = Arc::new(CheckerHealth::new());
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.requests_per_second,
        config.rate_limit.burst_size,
    ));
    let state = AppState {
        cache: cache.clone(),
        checker: checker.clone(),
        limiter,
        config: Arc::new(config),
    };
    TestApp {
        router: build_router(state),
        cache,
        checker,
    }
}

fn get(path: &str) -> Request<Body> {
    get_from(path, "10.0.0.1:4000", &[])
}

fn get_from(path: &str, peer: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut request = Request::builder().uri(path);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let mut request = request.body(Body::empty()).unwrap();
    let peer: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn uninitialized_cache_serves_503_default() {
    let app = test_app(|_| {});
    let response = app.router.oneshot(get("/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["state"], "uninitialized");
    assert_eq!(body["cache_state"], "uninitialized");
    assert_eq!(body["stale"], true);
    assert!(body["last_checked_seconds_ago"].is_null());
}

#[tokio::test]
async fn status_reflects_latest_cache_write() {
    let app = test_app(|_| {});
    app.cache.update_status(200, "active");

    let response = app.router.oneshot(get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status_code"], 200);
    assert_eq!(body["state"], "active");
    assert_eq!(body["cache_state"], "running");
    assert_eq!(body["stale"], false);
    assert_eq!(body["unit"], "demo.service");
}

#[tokio::test]
async fn error_result_served_with_500() {
    let app = test_app(|_| {});
    app.cache.update_status(500, "error");

    let response = app.router.oneshot(get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["cache_state"], "error");
}

#[tokio::test]
async fn healthz_tracks_checker_not_unit() {
    let app = test_app(|_| {});

    // Unit state is irrelevant; no cycle has completed yet.
    app.cache.update_status(200, "active");
    let response = app.router.clone().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["healthy"], false);

    app.checker.record_success();
    let response = app.router.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["healthy"], true);
    assert!(body["last_check_seconds_ago"].is_number());
}

#[tokio::test]
async fn burst_exhaustion_returns_429_with_headers() {
    let app = test_app(|config| {
        config.rate_limit.requests_per_second = 0.001;
        config.rate_limit.burst_size = 2;
    });

    for _ in 0..2 {
        let response = app.router.clone().oneshot(get("/status")).await.unwrap();
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    let response = app.router.oneshot(get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    assert_eq!(
        response.headers().get("x-ratelimit-remaining").unwrap(),
        "0"
    );
}

#[tokio::test]
async fn forwarded_clients_are_limited_independently() {
    let app = test_app(|config| {
        config.rate_limit.requests_per_second = 0.001;
        config.rate_limit.burst_size = 1;
    });

    // Same peer socket, different forwarded identities.
    let first = get_from("/status", "10.0.0.1:4000", &[("x-forwarded-for", "203.0.113.9")]);
    let again = get_from("/status", "10.0.0.1:4000", &[("x-forwarded-for", "203.0.113.9")]);
    let other = get_from("/status", "10.0.0.1:4000", &[("x-forwarded-for", "198.51.100.7")]);

    assert_ne!(
        app.router.clone().oneshot(first).await.unwrap().status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        app.router.clone().oneshot(again).await.unwrap().status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_ne!(
        app.router.oneshot(other).await.unwrap().status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn disabled_limiter_admits_everything() {
    let app = test_app(|config| {
        config.rate_limit.enabled = false;
        config.rate_limit.burst_size = 1;
    });

    for _ in 0..10 {
        let response = app.router.clone().oneshot(get("/status")).await.unwrap();
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}

#[tokio::test]
async fn watchdog_endpoint_is_not_rate_limited() {
    let app = test_app(|config| {
        config.rate_limit.requests_per_second = 0.001;
        config.rate_limit.burst_size = 1;
    });
    app.checker.record_success();

    // Exhaust the status endpoint for this client.
    let _ = app.router.clone().oneshot(get("/status")).await.unwrap();
    let response = app.router.clone().oneshot(get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // The watchdog still gets through.
    let response = app.router.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn limiter_stats_are_exposed() {
    let app = test_app(|config| {
        config.rate_limit.requests_per_second = 3.0;
        config.rate_limit.burst_size = 6;
    });

    let _ = app.router.clone().oneshot(get("/status")).await.unwrap();

    let response = app.router.oneshot(get("/admin/limiter")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["active_keys"], 1);
    assert_eq!(body["requests_per_second"], 3.0);
    assert_eq!(body["burst_size"], 6);
}
