//! In-process tests of the assembled router.

use axum::body::Body;
use axum::http::{header::LOCATION, Request, StatusCode};
use axum::Router;
use redirect_gateway::config::{GatewayConfig, RedirectConfig};
use redirect_gateway::http::HttpServer;
use tower::ServiceExt;

mod common;

use common::rule;

fn router(rules: Vec<RedirectConfig>, trust_forwarded_proto: bool) -> Router {
    let mut config = GatewayConfig {
        redirects: rules,
        ..GatewayConfig::default()
    };
    config.listener.trust_forwarded_proto = trust_forwarded_proto;
    HttpServer::new(config).unwrap().into_router()
}

async fn send(router: Router, host: &str, uri: &str) -> axum::response::Response {
    let request = Request::builder()
        .uri(uri)
        .header("Host", host)
        .body(Body::empty())
        .unwrap();
    router.oneshot(request).await.unwrap()
}

fn location(response: &axum::response::Response) -> Option<&str> {
    response.headers().get(LOCATION).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_host_scoped_rule() {
    let rules = vec![rule("//old.example.com/*", "https://new.example.com/:splat", 301)];

    let response = send(router(rules.clone(), false), "old.example.com", "/docs/a").await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), Some("https://new.example.com/docs/a"));

    let response = send(router(rules, false), "other.example.com", "/docs/a").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_named_params() {
    let rules = vec![rule("/blog/:year/:slug", "/posts/:slug?y=:year", 302)];

    let response = send(router(rules, false), "example.com", "/blog/2024/hello").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/posts/hello?y=2024"));
}

#[tokio::test]
async fn test_forwarded_proto_selects_scheme() {
    // Scheme-less destinations with a host inherit the request scheme
    let rules = vec![rule("/a", "cdn.example.com/a", 301)];

    let request = || {
        Request::builder()
            .uri("/a")
            .header("Host", "example.com")
            .header("X-Forwarded-Proto", "https")
            .body(Body::empty())
            .unwrap()
    };

    let response = router(rules.clone(), true).oneshot(request()).await.unwrap();
    assert_eq!(location(&response), Some("https://cdn.example.com/a"));

    let response = router(rules, false).oneshot(request()).await.unwrap();
    assert_eq!(location(&response), Some("http://cdn.example.com/a"));
}

#[tokio::test]
async fn test_query_rule_shadows_catch_all() {
    let rules = vec![
        rule("/search?q=rust", "/rust", 301),
        rule("/search", "/everything", 301),
    ];

    let response = send(router(rules.clone(), false), "example.com", "/search?q=rust").await;
    assert_eq!(location(&response), Some("/rust"));

    let response = send(router(rules, false), "example.com", "/search?q=go").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_same_host_target_is_not_redirected() {
    let rules = vec![rule("/a", "https://example.com/b", 301)];

    let response = send(router(rules.clone(), false), "example.com", "/a").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(router(rules, false), "www.example.com", "/a").await;
    assert_eq!(location(&response), Some("https://example.com/b"));
}

#[tokio::test]
async fn test_request_id_assigned() {
    let response = send(router(vec![rule("/a", "/b", 301)], false), "example.com", "/a").await;
    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}
