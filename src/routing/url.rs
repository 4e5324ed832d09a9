//! URL values for rule patterns and requests.
//!
//! # Responsibilities
//! - Parse absolute, scheme-relative and plain relative references
//! - Keep the decoded path for matching and the escaped form for output
//! - Render the canonical string used in `Location` headers
//!
//! # Design Decisions
//! - Generic RFC 3986 reference parsing, not WHATWG: `http:///a` has an
//!   empty host and `/a` is a valid (relative) value
//! - Hosts are kept as written (no lowercasing, no IDNA)
//! - The raw query is carried verbatim and compared byte for byte

use std::fmt;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};
use thiserror::Error;

/// Characters escaped when a decoded path is rendered back.
const PATH_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

const HOST_ESCAPE: &AsciiSet = &CONTROLS.add(b' ').add(b'%');

/// Error raised when a string is not a syntactically valid URL reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlParseError {
    #[error("invalid control character in URL")]
    ControlCharacter,

    #[error("missing protocol scheme")]
    MissingScheme,

    #[error("first path segment in URL cannot contain colon")]
    ColonInFirstSegment,

    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),

    #[error("invalid character {0:?} in host name")]
    InvalidHostCharacter(char),

    #[error("invalid port {0:?} after host")]
    InvalidPort(String),

    #[error("missing ']' in host")]
    MissingBracket,

    #[error("invalid userinfo")]
    InvalidUserinfo,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Component {
    Host,
    Other,
}

/// A parsed URL reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedUrl {
    scheme: String,
    opaque: String,
    userinfo: Option<String>,
    host: String,
    path: String,
    raw_path: Option<String>,
    raw_query: String,
    force_query: bool,
    fragment: Option<String>,
}

impl ResolvedUrl {
    /// Parse a URL reference.
    pub fn parse(input: &str) -> Result<Self, UrlParseError> {
        if input.chars().any(|c| c.is_ascii_control()) {
            return Err(UrlParseError::ControlCharacter);
        }

        let mut url = ResolvedUrl::default();

        let rest = match input.split_once('#') {
            Some((rest, fragment)) => {
                unescape(fragment, Component::Other)?;
                url.fragment = (!fragment.is_empty()).then(|| fragment.to_string());
                rest
            }
            None => input,
        };

        let (scheme, rest) = split_scheme(rest)?;
        url.scheme = scheme.to_ascii_lowercase();

        let mut rest = match rest.split_once('?') {
            Some((rest, query)) => {
                url.force_query = query.is_empty();
                url.raw_query = query.to_string();
                rest
            }
            None => rest,
        };

        if !rest.starts_with('/') {
            if !url.scheme.is_empty() {
                // e.g. `mailto:someone@example.com`
                url.opaque = rest.to_string();
                return Ok(url);
            }

            let first_segment = rest.split('/').next().unwrap_or_default();
            if first_segment.contains(':') {
                return Err(UrlParseError::ColonInFirstSegment);
            }
        }

        if (!url.scheme.is_empty() || !rest.starts_with("///")) && rest.starts_with("//") {
            let after = &rest[2..];
            let end = after.find('/').unwrap_or(after.len());
            let (userinfo, host) = parse_authority(&after[..end])?;
            url.userinfo = userinfo;
            url.host = host;
            rest = &after[end..];
        }

        url.set_path(rest)?;
        Ok(url)
    }

    /// Lowercased scheme, empty for relative references.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host (with port, if any), empty when absent.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Percent-decoded path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string exactly as written, without the `?`.
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn has_host(&self) -> bool {
        !self.host.is_empty()
    }

    /// Replace the query string.
    pub fn set_raw_query(&mut self, query: impl Into<String>) {
        self.raw_query = query.into();
        self.force_query = false;
    }

    /// Copy of this URL with `/` appended to its path.
    pub fn with_trailing_slash(&self) -> Self {
        let mut url = self.clone();
        url.path.push('/');
        if let Some(raw) = url.raw_path.as_mut() {
            raw.push('/');
        }
        url
    }

    /// The path in its escaped form.
    pub fn escaped_path(&self) -> String {
        if let Some(raw) = &self.raw_path {
            if is_valid_encoded(raw)
                && unescape(raw, Component::Other).ok().as_deref() == Some(self.path.as_str())
            {
                return raw.clone();
            }
        }
        utf8_percent_encode(&self.path, PATH_ESCAPE).to_string()
    }

    fn set_path(&mut self, escaped: &str) -> Result<(), UrlParseError> {
        self.path = unescape(escaped, Component::Other)?;
        let canonical = utf8_percent_encode(&self.path, PATH_ESCAPE).to_string();
        self.raw_path = (canonical != escaped).then(|| escaped.to_string());
        Ok(())
    }
}

impl FromStr for ResolvedUrl {
    type Err = UrlParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResolvedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();

        if !self.scheme.is_empty() {
            out.push_str(&self.scheme);
            out.push(':');
        }

        if !self.opaque.is_empty() {
            out.push_str(&self.opaque);
        } else {
            if !self.scheme.is_empty() || !self.host.is_empty() || self.userinfo.is_some() {
                if !self.host.is_empty() || !self.path.is_empty() || self.userinfo.is_some() {
                    out.push_str("//");
                }
                if let Some(userinfo) = &self.userinfo {
                    out.push_str(userinfo);
                    out.push('@');
                }
                out.extend(utf8_percent_encode(&self.host, HOST_ESCAPE));
            }

            let path = self.escaped_path();
            if !path.is_empty() && !path.starts_with('/') && !self.host.is_empty() {
                out.push('/');
            }
            if out.is_empty() {
                // Keep `a:b` from being read back as a scheme
                let first_segment = path.split('/').next().unwrap_or_default();
                if first_segment.contains(':') {
                    out.push_str("./");
                }
            }
            out.push_str(&path);
        }

        if self.force_query || !self.raw_query.is_empty() {
            out.push('?');
            out.push_str(&self.raw_query);
        }

        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }

        f.write_str(&out)
    }
}

fn split_scheme(input: &str) -> Result<(&str, &str), UrlParseError> {
    for (i, byte) in input.bytes().enumerate() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' => {}
            b'0'..=b'9' | b'+' | b'-' | b'.' if i > 0 => {}
            b':' if i == 0 => return Err(UrlParseError::MissingScheme),
            b':' => return Ok((&input[..i], &input[i + 1..])),
            _ => return Ok(("", input)),
        }
    }
    Ok(("", input))
}

fn parse_authority(authority: &str) -> Result<(Option<String>, String), UrlParseError> {
    let (userinfo, host) = match authority.rfind('@') {
        Some(at) => (Some(&authority[..at]), &authority[at + 1..]),
        None => (None, authority),
    };

    if let Some(userinfo) = userinfo {
        if !userinfo.bytes().all(is_userinfo_byte) {
            return Err(UrlParseError::InvalidUserinfo);
        }
    }

    Ok((userinfo.map(str::to_string), parse_host(host)?))
}

fn parse_host(host: &str) -> Result<String, UrlParseError> {
    let port = if host.starts_with('[') {
        let close = host.rfind(']').ok_or(UrlParseError::MissingBracket)?;
        &host[close + 1..]
    } else {
        host.rfind(':').map_or("", |colon| &host[colon..])
    };

    if !is_valid_port(port) {
        return Err(UrlParseError::InvalidPort(port.to_string()));
    }

    unescape(host, Component::Host)
}

fn is_valid_port(port: &str) -> bool {
    port.is_empty()
        || port
            .strip_prefix(':')
            .is_some_and(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
}

fn is_host_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"-_.~!$&'()*+,;=:[]<>\"".contains(&byte)
}

fn is_userinfo_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"-._:~!$&'()*+,;=%@".contains(&byte)
}

/// Whether an already-escaped path can be emitted as is.
fn is_valid_encoded(raw: &str) -> bool {
    raw.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b"-_.~!$&'()*+,;=:@[]/%".contains(&b))
}

fn unescape(input: &str, component: Component) -> Result<String, UrlParseError> {
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let valid = bytes
                    .get(i + 1..i + 3)
                    .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
                if !valid {
                    let bad: String = input[i..].chars().take(3).collect();
                    return Err(UrlParseError::InvalidEscape(bad));
                }
                i += 3;
            }
            byte if component == Component::Host && byte.is_ascii() && !is_host_byte(byte) => {
                return Err(UrlParseError::InvalidHostCharacter(byte as char));
            }
            _ => i += 1,
        }
    }

    Ok(percent_decode_str(input).decode_utf8_lossy().into_owned())
}
