//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, scheme/host detection, RequestTarget)
//!     → middleware/redirects.rs (run the Redirector)
//!         → response.rs (redirect response)          on match
//!         → server.rs pass-through (upstream / 404)  otherwise
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, request_target, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
