//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the pass-through handler
//! - Wire up middleware (redirects, timeout, request ID, tracing)
//! - Bind server to listener and shut down gracefully
//! - Forward unmatched requests to the upstream origin

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::validation::check_upstream;
use crate::config::GatewayConfig;
use crate::http::middleware::{redirect_middleware, RedirectState};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::routing::Redirector;

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid upstream address {address:?}: {reason}")]
    InvalidUpstream { address: String, reason: String },
}

/// Origin that receives requests no rule redirected.
#[derive(Debug, Clone)]
pub struct Upstream {
    authority: Authority,
}

impl Upstream {
    pub fn from_address(address: &str) -> Result<Self, ServerError> {
        let invalid = |reason: String| ServerError::InvalidUpstream {
            address: address.to_string(),
            reason,
        };

        let url = check_upstream(address).map_err(invalid)?;
        let host = url.host_str().unwrap_or_default();
        let port = url.port_or_known_default().unwrap_or(80);
        let authority =
            Authority::from_str(&format!("{host}:{port}")).map_err(|e| invalid(e.to_string()))?;

        Ok(Self { authority })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Option<Upstream>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the redirect gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    rule_count: usize,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let redirector = Arc::new(Redirector::from_config(config.redirects.clone()));
        let rule_count = redirector.len();

        let upstream = config
            .upstream
            .address
            .as_deref()
            .map(Upstream::from_address)
            .transpose()?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState { upstream, client };
        let redirect_state = RedirectState {
            redirector,
            trust_forwarded_proto: config.listener.trust_forwarded_proto,
        };

        let router = Self::build_router(&config, state, redirect_state);
        Ok(Self {
            router,
            config,
            rule_count,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState, redirect_state: RedirectState) -> Router {
        Router::new()
            .fallback(pass_through_handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(redirect_state, redirect_middleware))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::REQUEST_TIMEOUT,
                        Duration::from_secs(config.timeouts.request_secs),
                    )),
            )
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rules = self.rule_count,
            upstream = ?self.config.upstream.address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The assembled router, for serving in-process.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Handles every request the redirect middleware let through.
async fn pass_through_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request).to_string();

    let Some(upstream) = state.upstream.as_ref() else {
        tracing::debug!(request_id = %request_id, path = %request.uri().path(), "No upstream configured");
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    let (mut parts, body) = request.into_parts();

    // URI rewrite, Host header left as the client sent it
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(upstream.authority().clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Cannot build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    parts.version = Version::HTTP_11;

    let result: Result<Response<Incoming>, _> = state.client.request(Request::from_parts(parts, body)).await;
    match result {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
