//! Single-rule resolution.
//!
//! # Responsibilities
//! - Decide what one rule means for one request
//! - Substitute captured parameters and the splat into the destination
//! - Guard against redirect loops and rules scoped to other hosts
//!
//! # Gates (first one that fires decides)
//! ```text
//! request has host+scheme?        no  → InvalidRequestUrl
//! contextualize from              err → InvalidFrom
//! path matches?                   no  → NoMatch            (non-terminal)
//! substitute + contextualize to   err → InvalidTo
//! target == request (cleaned/raw) yes → Equivalent
//! from has query?                 yes → Redirect | Disqualified(QueryMismatch)
//! host compatibility              bad → Disqualified(HostMismatch | SameHostTarget)
//! $ENFORCE_TRAILING_SLASH         yes → Redirect(request + "/") | Disqualified(..)
//! otherwise                           → Redirect(to)
//! ```
//!
//! # Design Decisions
//! - Pure function of (rule, request, context); no caching
//! - Every outcome except `NoMatch` stops rule evaluation for the request

use thiserror::Error;

use crate::routing::context::{contextualize, MatchContext};
use crate::routing::matcher::{PathMatch, PathPattern};
use crate::routing::rule::{Directive, Rule};
use crate::routing::url::{ResolvedUrl, UrlParseError};

/// Placeholder in a destination replaced by the wildcard capture.
pub const SPLAT_PLACEHOLDER: &str = ":splat";

/// Errors raised while resolving a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("request url must have both host and scheme")]
    InvalidRequestUrl,

    #[error("invalid source pattern {pattern:?}: {source}")]
    InvalidFrom {
        pattern: String,
        #[source]
        source: UrlParseError,
    },

    #[error("invalid destination {destination:?}: {source}")]
    InvalidTo {
        destination: String,
        #[source]
        source: UrlParseError,
    },
}

/// Why a rule whose path matched still produced no redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disqualification {
    /// `from` carries a query string that differs from the request's.
    QueryMismatch,
    /// `from` is scoped to a host other than the requested one.
    HostMismatch,
    /// `to` points at the host already serving the request.
    SameHostTarget,
    /// Trailing slash enforcement skipped a `file.ext`-looking request.
    FileLikeRequest,
    /// Trailing slash enforcement found the slash already there.
    TrailingSlashPresent,
}

impl Disqualification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disqualification::QueryMismatch => "query_mismatch",
            Disqualification::HostMismatch => "host_mismatch",
            Disqualification::SameHostTarget => "same_host_target",
            Disqualification::FileLikeRequest => "file_like_request",
            Disqualification::TrailingSlashPresent => "trailing_slash_present",
        }
    }
}

/// A matched rule that should produce a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect<'r> {
    pub target: ResolvedUrl,
    pub captures: PathMatch,
    /// Target host differs from the requested host.
    pub cross_host: bool,
    pub rule: &'r Rule,
}

/// Result of evaluating one rule against one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<'r> {
    /// Path did not match; try the next rule.
    NoMatch,
    /// Path matched but a gate refused the redirect.
    Disqualified(Disqualification),
    /// The destination is the request itself.
    Equivalent { target: ResolvedUrl },
    Redirect(Redirect<'r>),
}

impl MatchOutcome<'_> {
    /// Whether evaluation must stop at this rule.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchOutcome::NoMatch)
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Redirect(_))
    }

    pub fn is_cross_host(&self) -> bool {
        matches!(self, MatchOutcome::Redirect(redirect) if redirect.cross_host)
    }
}

/// Evaluate `rule` against the normalized request URL.
pub fn resolve_rule<'r>(
    rule: &'r Rule,
    request: &ResolvedUrl,
    ctx: &MatchContext,
) -> Result<MatchOutcome<'r>, ResolveError> {
    if request.host().is_empty() || request.scheme().is_empty() {
        return Err(ResolveError::InvalidRequestUrl);
    }

    let from = contextualize(&rule.from, ctx).map_err(|source| ResolveError::InvalidFrom {
        pattern: rule.from.clone(),
        source,
    })?;

    let pattern = PathPattern::new(from.path().trim_matches('/'));
    let Some(captures) = pattern.matches(request.path().trim_matches('/')) else {
        return Ok(MatchOutcome::NoMatch);
    };

    let destination = substitute(&rule.to, &captures);
    let to = contextualize(&destination, ctx)
        .map_err(|source| ResolveError::InvalidTo { destination, source })?;

    // Mapping a path onto itself would loop forever. The request path is
    // cleaned, so the path as sent is checked too.
    let same_origin = to.host() == request.host() || !to.has_host();
    if same_origin && (to.path() == request.path() || to.path() == ctx.original_path()) {
        return Ok(MatchOutcome::Equivalent { target: to });
    }

    if !from.raw_query().is_empty() {
        if from.raw_query() != request.raw_query() {
            return Ok(MatchOutcome::Disqualified(Disqualification::QueryMismatch));
        }
        return Ok(MatchOutcome::Redirect(Redirect {
            target: to,
            captures,
            cross_host: false,
            rule,
        }));
    }

    let cross_host = to.has_host() && to.host() != request.host();

    match (from.has_host(), to.has_host()) {
        // host-to-host, host-to-relative
        (true, _) if from.host() != request.host() => {
            return Ok(MatchOutcome::Disqualified(Disqualification::HostMismatch));
        }
        // relative-to-host
        (false, true) if to.host() == request.host() => {
            return Ok(MatchOutcome::Disqualified(Disqualification::SameHostTarget));
        }
        _ => {}
    }

    if rule.has_directive(Directive::EnforceTrailingSlash) {
        let original = ctx.original_path();

        if looks_like_file(original) {
            return Ok(MatchOutcome::Disqualified(Disqualification::FileLikeRequest));
        }
        if original.ends_with('/') {
            return Ok(MatchOutcome::Disqualified(Disqualification::TrailingSlashPresent));
        }

        return Ok(MatchOutcome::Redirect(Redirect {
            target: request.with_trailing_slash(),
            captures,
            cross_host,
            rule,
        }));
    }

    Ok(MatchOutcome::Redirect(Redirect {
        target: to,
        captures,
        cross_host,
        rule,
    }))
}

/// Replace `:name` placeholders and `:splat` in a destination pattern.
pub fn substitute(destination: &str, captures: &PathMatch) -> String {
    let mut params: Vec<&(String, String)> = captures.params.iter().collect();
    // `:id` must not eat the front of `:identifier`
    params.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = destination.to_string();
    for (name, value) in params {
        out = out.replace(&format!(":{name}"), value);
    }
    out.replace(SPLAT_PLACEHOLDER, &captures.trailing)
}

/// `name.ext` with a 2 to 5 byte extension after the last dot.
fn looks_like_file(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, extension)| (2..=5).contains(&extension.len()))
}
