//! Redirect response construction.
//!
//! # Responsibilities
//! - Turn a matched rule into a status + `Location` response
//! - Add a client-side redirect page when the status is not 3xx
//!
//! # Design Decisions
//! - `Location` always carries the resolved target, whatever the status
//! - 3xx responses have an empty body; browsers follow the header
//! - The target is HTML-escaped everywhere it appears in the page

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::Redirect;

/// Build the response for a matched redirect.
pub fn redirect_response(redirect: &Redirect<'_>) -> Response {
    let location = redirect.target.to_string();

    let Ok(location_header) = HeaderValue::from_str(&location) else {
        tracing::error!(location = %location, "Redirect target is not a valid header value");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    // Statuses are range-checked when the config is loaded
    let status = StatusCode::from_u16(redirect.rule.status).unwrap_or(StatusCode::MOVED_PERMANENTLY);

    let mut response = if redirect.rule.is_http_redirect() {
        Response::new(Body::empty())
    } else {
        let mut response = Response::new(Body::from(html_redirect_page(&location)));
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        response
    };

    *response.status_mut() = status;
    response.headers_mut().insert(LOCATION, location_header);
    response
}

/// Minimal page that redirects via script and meta refresh.
pub fn html_redirect_page(url: &str) -> String {
    let safe = escape_html(url);
    format!(
        r#"<!DOCTYPE html>
<html>
	<head>
		<title>Redirecting...</title>
		<script>window.location.replace("{safe}");</script>
		<meta http-equiv="refresh" content="0; URL='{safe}'">
	</head>
	<body>Redirecting to <a href="{safe}">{safe}</a>...</body>
</html>
"#
    )
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            c => out.push(c),
        }
    }
    out
}
