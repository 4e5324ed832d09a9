//! Request handling.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) and propagate it to the response
//! - Work out the scheme and host the client used
//! - Build the RequestTarget that redirect rules are evaluated against
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - `X-Forwarded-Proto` is ignored unless explicitly trusted
//! - `Host` header wins over the URI authority (HTTP/1.1 origin-form)

use axum::http::header::HOST;
use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use uuid::Uuid;

use crate::routing::{RequestTarget, Scheme, UrlParseError};

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Header set by TLS-terminating proxies.
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Layer that assigns an ID to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// The request ID, or `"unknown"` if the layer did not run.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Scheme the client used to reach us.
pub fn request_scheme<B>(request: &Request<B>, trust_forwarded_proto: bool) -> Scheme {
    if trust_forwarded_proto {
        let forwarded = request
            .headers()
            .get(X_FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim);

        if let Some(proto) = forwarded {
            return Scheme::from_tls(proto.eq_ignore_ascii_case("https"));
        }
    }

    Scheme::from_tls(request.uri().scheme_str() == Some("https"))
}

/// Build the rule-evaluation target for an incoming request.
pub fn request_target<B>(
    request: &Request<B>,
    trust_forwarded_proto: bool,
) -> Result<RequestTarget, UrlParseError> {
    let scheme = request_scheme(request, trust_forwarded_proto);
    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default();

    RequestTarget::new(scheme, host, request.uri().path(), request.uri().query())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> axum::http::request::Builder {
        Request::builder().uri(uri)
    }

    #[test]
    fn test_target_from_host_header() {
        let req = get("/blog/post/?page=2")
            .header("Host", "example.com")
            .body(())
            .unwrap();

        let target = request_target(&req, false).unwrap();
        assert_eq!(target.url.to_string(), "http://example.com/blog/post?page=2");
        assert_eq!(target.context.original_path(), "/blog/post/");
    }

    #[test]
    fn test_target_from_absolute_uri() {
        let req = get("https://example.com/a").body(()).unwrap();

        let target = request_target(&req, false).unwrap();
        assert_eq!(target.context.scheme(), Scheme::Https);
        assert_eq!(target.url.host(), "example.com");
    }

    #[test]
    fn test_forwarded_proto_requires_trust() {
        let req = get("/a")
            .header("Host", "example.com")
            .header("X-Forwarded-Proto", "https, http")
            .body(())
            .unwrap();

        assert_eq!(request_scheme(&req, false), Scheme::Http);
        assert_eq!(request_scheme(&req, true), Scheme::Https);
    }

    #[test]
    fn test_request_id_fallback() {
        let req = get("/").body(()).unwrap();
        assert_eq!(request_id(&req), "unknown");

        let req = get("/").header("x-request-id", "abc").body(()).unwrap();
        assert_eq!(request_id(&req), "abc");
    }

    #[test]
    fn test_make_request_uuid() {
        let req = get("/").body(()).unwrap();
        let id = MakeRequestUuid.make_request_id(&req).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
