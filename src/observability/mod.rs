//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (request_id, rule, status)
//!     → TraceLayer spans around every HTTP request
//!
//! Consumers:
//!     → logging.rs subscriber (pretty or JSON on stdout)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through all log lines for a request
//! - `RUST_LOG` overrides the configured level

pub mod logging;
