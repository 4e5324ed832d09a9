//! Redirect middleware.
//! Answers matched requests with a redirect; everything else goes to the next service.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use crate::http::request::{request_id, request_target};
use crate::http::response::redirect_response;
use crate::routing::{Redirector, Resolution};

/// State required by the redirect middleware.
#[derive(Clone)]
pub struct RedirectState {
    pub redirector: Arc<Redirector>,
    pub trust_forwarded_proto: bool,
}

pub async fn redirect_middleware(
    State(state): State<RedirectState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // 1. Nothing configured, nothing to check
    if state.redirector.is_empty() {
        return next.run(request).await;
    }

    // 2. Normalize the request URL
    let target = match request_target(&request, state.trust_forwarded_proto) {
        Ok(target) => target,
        Err(e) => {
            warn!(
                request_id = %request_id(&request),
                uri = %request.uri(),
                error = %e,
                "Cannot evaluate redirects for request"
            );
            return next.run(request).await;
        }
    };

    // 3. Walk the rules
    let response = match state.redirector.resolve(&target) {
        Resolution::Redirect(redirect) => {
            info!(
                request_id = %request_id(&request),
                from = %redirect.rule.from,
                status = redirect.rule.status,
                location = %redirect.target,
                cross_host = redirect.cross_host,
                "Redirecting"
            );
            Some(redirect_response(&redirect))
        }
        Resolution::PassThrough => None,
    };

    match response {
        Some(response) => response,
        None => next.run(request).await,
    }
}
