//! Redirect gateway library.
//!
//! Evaluates an ordered table of redirect rules against incoming requests
//! and either answers with a redirect or passes the request through.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Redirector, RequestTarget, Resolution};
