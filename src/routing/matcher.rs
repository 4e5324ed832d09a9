//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile a rule's source path into literal, parameter and wildcard segments
//! - Match a request path segment by segment
//! - Capture named parameters (in pattern order) and the trailing wildcard
//!
//! # Design Decisions
//! - Patterns and paths are matched with leading/trailing `/` already trimmed
//! - Literal segments are case-sensitive
//! - `:name` captures exactly one segment (possibly empty)
//! - A final `*` captures everything left, slashes included
//! - No regex: matching is a single left-to-right scan

/// One segment of a compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled source path such as `blog/:year/:slug` or `docs/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
    trailing: bool,
}

/// Captures produced by a successful [`PathPattern::matches`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    /// Named parameters in the order they appear in the pattern.
    pub params: Vec<(String, String)>,
    /// Whatever the trailing wildcard consumed (empty when none).
    pub trailing: String,
}

impl PathMatch {
    /// Look up a named parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl PathPattern {
    /// Compile a pattern. The pattern is expected without surrounding slashes.
    pub fn new(pattern: &str) -> Self {
        let mut raw: Vec<&str> = pattern.split('/').collect();
        let trailing = raw.last() == Some(&"*");
        if trailing {
            raw.pop();
        }

        let segments = raw
            .into_iter()
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(segment.to_string()),
            })
            .collect();

        Self { segments, trailing }
    }

    /// Whether the pattern ends in a `*` wildcard.
    pub fn is_trailing(&self) -> bool {
        self.trailing
    }

    /// Match a path (without surrounding slashes) against this pattern.
    pub fn matches(&self, path: &str) -> Option<PathMatch> {
        let mut params = Vec::new();
        let mut rest = path;
        let last = self.segments.len().saturating_sub(1);

        for (index, segment) in self.segments.iter().enumerate() {
            let (head, tail) = match rest.find('/') {
                Some(slash) => {
                    // A slash after the final segment is only fine for wildcards
                    if index == last && !self.trailing {
                        return None;
                    }
                    (&rest[..slash], &rest[slash + 1..])
                }
                None => {
                    // Path exhausted before the pattern
                    if index != last {
                        return None;
                    }
                    (rest, "")
                }
            };

            match segment {
                Segment::Param(name) => params.push((name.clone(), head.to_string())),
                Segment::Literal(literal) if literal == head => {}
                Segment::Literal(_) => return None,
            }

            rest = tail;
        }

        Some(PathMatch {
            params,
            trailing: rest.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let pattern = PathPattern::new("about/team");
        assert!(pattern.matches("about/team").is_some());
        assert!(pattern.matches("about").is_none());
        assert!(pattern.matches("about/team/extra").is_none());
        assert!(pattern.matches("About/team").is_none()); // Case sensitive
    }

    #[test]
    fn test_param_capture() {
        let pattern = PathPattern::new("blog/:year/:slug");
        let m = pattern.matches("blog/2024/hello-world").unwrap();

        assert_eq!(
            m.params,
            vec![
                ("year".to_string(), "2024".to_string()),
                ("slug".to_string(), "hello-world".to_string()),
            ]
        );
        assert_eq!(m.param("slug"), Some("hello-world"));
        assert_eq!(m.trailing, "");
    }

    #[test]
    fn test_trailing_wildcard() {
        let pattern = PathPattern::new("old/*");
        assert!(pattern.is_trailing());

        let m = pattern.matches("old/a/b/c").unwrap();
        assert_eq!(m.trailing, "a/b/c");

        // The wildcard may capture nothing
        let m = pattern.matches("old").unwrap();
        assert_eq!(m.trailing, "");

        assert!(pattern.matches("older/a").is_none());
    }

    #[test]
    fn test_bare_wildcard_matches_everything() {
        let pattern = PathPattern::new("*");
        assert_eq!(pattern.matches("").unwrap().trailing, "");
        assert_eq!(pattern.matches("x/y").unwrap().trailing, "x/y");
    }

    #[test]
    fn test_empty_pattern_matches_root_only() {
        let pattern = PathPattern::new("");
        assert!(pattern.matches("").is_some());
        assert!(pattern.matches("index").is_none());
    }

    #[test]
    fn test_param_then_wildcard() {
        let pattern = PathPattern::new(":lang/docs/*");
        let m = pattern.matches("en/docs/guide/intro").unwrap();
        assert_eq!(m.param("lang"), Some("en"));
        assert_eq!(m.trailing, "guide/intro");
    }

    #[test]
    fn test_bare_colon_is_literal() {
        let pattern = PathPattern::new("a/:");
        let m = pattern.matches("a/:").unwrap();
        assert!(m.params.is_empty());
        assert!(pattern.matches("a/zzz").is_none());
    }
}
