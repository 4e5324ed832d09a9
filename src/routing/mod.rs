//! Redirect routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (scheme, host, path, query)
//!     → context.rs (RequestTarget: cleaned URL + MatchContext)
//!     → router.rs (walk rules in order)
//!     → resolver.rs (one rule: gates, substitution)
//!         → matcher.rs (path pattern match)
//!         → url.rs (parse from/to)
//!     → Return: Redirect or PassThrough
//!
//! Rule compilation (at startup):
//!     RedirectConfig[]
//!     → Rule (directives extracted from `to`)
//!     → Freeze as immutable Redirector
//! ```
//!
//! # Design Decisions
//! - Rules are evaluated in file order, never re-sorted
//! - Deterministic: same input always yields the same resolution
//! - First terminal outcome wins

pub mod context;
pub mod matcher;
pub mod resolver;
pub mod router;
pub mod rule;
pub mod url;

pub use context::{contextualize, MatchContext, RequestTarget, Scheme};
pub use matcher::{PathMatch, PathPattern};
pub use resolver::{resolve_rule, Disqualification, MatchOutcome, Redirect, ResolveError};
pub use router::{Evaluation, Redirector, Resolution};
pub use rule::{Directive, Rule};
pub use url::{ResolvedUrl, UrlParseError};
