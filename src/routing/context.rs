//! Per-request matching context and URL contextualization.
//!
//! # Responsibilities
//! - Carry the request-derived defaults (scheme, original path)
//! - Turn rule patterns into URLs, borrowing the request scheme when needed
//! - Build the normalized request URL that rules are evaluated against
//!
//! # Design Decisions
//! - A pattern counts as absolute if it contains `http://` or `https://`
//!   anywhere; this is a substring test, not a scheme check
//! - A scheme is only borrowed when doing so yields a host, so `/path`
//!   stays relative instead of gaining a fabricated host

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::routing::url::{ResolvedUrl, UrlParseError};

/// Scheme the request arrived with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn from_tls(tls: bool) -> Self {
        if tls {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    /// Literal prefix prepended to scheme-less patterns.
    pub fn prefix(&self) -> &'static str {
        match self {
            Scheme::Http => "http://",
            Scheme::Https => "https://",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => f.write_str("http"),
            Scheme::Https => f.write_str("https"),
        }
    }
}

/// Request-derived defaults, built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchContext {
    scheme: Scheme,
    original_path: String,
}

impl MatchContext {
    pub fn new(scheme: Scheme, original_path: impl Into<String>) -> Self {
        Self {
            scheme,
            original_path: original_path.into(),
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The request path before any cleaning.
    pub fn original_path(&self) -> &str {
        &self.original_path
    }
}

/// Resolve a possibly relative, possibly host-less string into a URL.
pub fn contextualize(input: &str, ctx: &MatchContext) -> Result<ResolvedUrl, UrlParseError> {
    if input.contains("http://") || input.contains("https://") {
        return ResolvedUrl::parse(input);
    }

    let prefixed = ResolvedUrl::parse(&format!("{}{}", ctx.scheme.prefix(), input))?;
    if prefixed.has_host() {
        Ok(prefixed)
    } else {
        ResolvedUrl::parse(input)
    }
}

/// A request ready for rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub url: ResolvedUrl,
    pub context: MatchContext,
}

impl RequestTarget {
    /// Build the normalized request URL from its wire parts.
    ///
    /// `raw_path` is the escaped request path. Host and path are joined and
    /// cleaned like a filesystem path, so `/about/` becomes `/about` and the
    /// root path becomes empty; the untouched path stays in the context.
    pub fn new(
        scheme: Scheme,
        host: &str,
        raw_path: &str,
        raw_query: Option<&str>,
    ) -> Result<Self, UrlParseError> {
        let original_path = percent_decode_str(raw_path).decode_utf8_lossy().into_owned();
        let context = MatchContext::new(scheme, original_path);

        let mut url = contextualize(&join_clean(host, raw_path), &context)?;
        url.set_raw_query(raw_query.unwrap_or_default());

        Ok(Self { url, context })
    }

    /// Build a target from an absolute URL string (used by the offline CLI).
    pub fn from_absolute(input: &str) -> Result<Self, UrlParseError> {
        let url = ResolvedUrl::parse(input)?;
        let scheme = Scheme::from_tls(url.scheme() == "https");
        let raw_path = url.escaped_path();
        let query = url.raw_query().to_string();
        Self::new(scheme, url.host(), &raw_path, Some(&query))
    }
}

/// Join `host` and `path` with `/` and clean the result.
fn join_clean(host: &str, path: &str) -> String {
    let joined = match (host.is_empty(), path.is_empty()) {
        (true, true) => return String::new(),
        (true, false) => path.to_string(),
        (false, true) => host.to_string(),
        (false, false) => format!("{host}/{path}"),
    };
    clean_path(&joined)
}

/// Lexical path cleaning: collapse `//`, drop `.`, resolve `..`, strip the
/// trailing slash.
fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            part => parts.push(part),
        }
    }

    let cleaned = parts.join("/");
    match (rooted, cleaned.is_empty()) {
        (true, _) => format!("/{cleaned}"),
        (false, true) => ".".to_string(),
        (false, false) => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(scheme: Scheme) -> MatchContext {
        MatchContext::new(scheme, "/")
    }

    #[test]
    fn test_relative_path_stays_relative() {
        let url = contextualize("/blog/:slug", &ctx(Scheme::Https)).unwrap();
        assert_eq!(url.scheme(), "");
        assert_eq!(url.host(), "");
        assert_eq!(url.path(), "/blog/:slug");
    }

    #[test]
    fn test_bare_host_borrows_scheme() {
        let url = contextualize("example.com/docs", &ctx(Scheme::Https)).unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host(), "example.com");
        assert_eq!(url.path(), "/docs");
    }

    #[test]
    fn test_scheme_relative_keeps_host() {
        let url = contextualize("//old.example.com/x", &ctx(Scheme::Http)).unwrap();
        assert_eq!(url.scheme(), "");
        assert_eq!(url.host(), "old.example.com");
        assert_eq!(url.path(), "/x");
    }

    #[test]
    fn test_absolute_untouched() {
        let url = contextualize("http://example.com/a", &ctx(Scheme::Https)).unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_embedded_scheme_substring_counts_as_absolute() {
        // Known fragility: the substring test fires even inside a path
        let url = contextualize("/go/http://elsewhere", &ctx(Scheme::Https)).unwrap();
        assert_eq!(url.scheme(), "");
        assert_eq!(url.host(), "");
        assert_eq!(url.path(), "/go/http://elsewhere");
    }

    #[test]
    fn test_prefixed_parse_error_is_reported() {
        assert!(contextualize("bad host/x", &ctx(Scheme::Http)).is_err());
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("example.com//about/"), "example.com/about");
        assert_eq!(clean_path("/a/./b/../c"), "/a/c");
        assert_eq!(clean_path("/.."), "/");
        assert_eq!(clean_path("a/../.."), "..");
        assert_eq!(clean_path(""), ".");
    }

    #[test]
    fn test_request_target() {
        let target =
            RequestTarget::new(Scheme::Https, "example.com", "/about/", Some("a=1")).unwrap();
        assert_eq!(target.url.to_string(), "https://example.com/about?a=1");
        assert_eq!(target.context.original_path(), "/about/");
        assert_eq!(target.context.scheme(), Scheme::Https);
    }

    #[test]
    fn test_request_target_root() {
        let target = RequestTarget::new(Scheme::Http, "example.com", "/", None).unwrap();
        assert_eq!(target.url.path(), "");
        assert_eq!(target.url.host(), "example.com");
    }

    #[test]
    fn test_request_target_without_host() {
        let target = RequestTarget::new(Scheme::Http, "", "/about", None).unwrap();
        assert!(!target.url.has_host());
        assert_eq!(target.url.scheme(), "");
    }

    #[test]
    fn test_from_absolute() {
        let target = RequestTarget::from_absolute("https://example.com/a%20b/?q=1").unwrap();
        assert_eq!(target.url.host(), "example.com");
        assert_eq!(target.url.path(), "/a b");
        assert_eq!(target.url.raw_query(), "q=1");
        assert_eq!(target.context.original_path(), "/a b/");
    }
}
