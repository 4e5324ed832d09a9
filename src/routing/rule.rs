//! Redirect rules.

use serde::Serialize;

use crate::config::RedirectConfig;

/// Token in a rule's destination that asks for a trailing-slash redirect.
pub const ENFORCE_TRAILING_SLASH: &str = "$ENFORCE_TRAILING_SLASH";

/// Special behaviour requested by a `|`-separated token in `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    EnforceTrailingSlash,
}

impl Directive {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            ENFORCE_TRAILING_SLASH => Some(Directive::EnforceTrailingSlash),
            _ => None,
        }
    }
}

/// One `from → to` mapping, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Source pattern: optional host, path segments, optional query.
    pub from: String,
    /// Destination pattern, possibly followed by `|` directives.
    pub to: String,
    /// Response status.
    pub status: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    directives: Vec<Directive>,
}

impl Rule {
    pub fn new(from: impl Into<String>, to: impl Into<String>, status: u16) -> Self {
        let to = to.into();
        let directives = to.split('|').filter_map(Directive::from_token).collect();

        Self {
            from: from.into(),
            to,
            status,
            directives,
        }
    }

    pub fn has_directive(&self, directive: Directive) -> bool {
        self.directives.contains(&directive)
    }

    /// Whether the response is an HTTP 3xx redirect.
    pub fn is_http_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

impl From<RedirectConfig> for Rule {
    fn from(config: RedirectConfig) -> Self {
        Rule::new(config.from, config.to, config.status)
    }
}
