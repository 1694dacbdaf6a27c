// ABOUTME: Request-origin resolution and redirect-target sanitization for OAuth flows
// ABOUTME: Defends the callback handler against open-redirect and scheme-injection input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

//! URL handling for the authentication callback flow
//!
//! Redirect destinations arrive on a publicly reachable callback URL and
//! are echoed through a third-party OAuth provider, so every input here is
//! attacker-influenced. Both functions are total: malformed input degrades
//! to a conservative default and emits a `warn` event, never an error.

use crate::constants::{DEFAULT_ALLOWED_SCHEMES, DEFAULT_APP_BASE_URL, DEFAULT_DESTINATION};
use axum::http::HeaderMap;
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;
use url::Url;

/// Origin used when no header or URL yields a usable scheme+host
const FALLBACK_ORIGIN: &str = DEFAULT_APP_BASE_URL;

static GENERIC_SCHEME_RE: OnceLock<Option<Regex>> = OnceLock::new();
static HTTP_SCHEME_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn generic_scheme_re() -> Option<&'static Regex> {
    GENERIC_SCHEME_RE
        .get_or_init(|| Regex::new(r"(?i)^[a-z][a-z0-9+.-]*://").ok())
        .as_ref()
}

fn http_scheme_re() -> Option<&'static Regex> {
    HTTP_SCHEME_RE
        .get_or_init(|| Regex::new(r"(?i)^https?://").ok())
        .as_ref()
}

fn has_generic_scheme(value: &str) -> bool {
    generic_scheme_re().is_some_and(|re| re.is_match(value))
}

fn has_http_scheme(value: &str) -> bool {
    http_scheme_re().is_some_and(|re| re.is_match(value))
}

fn trim_trailing_slashes(value: &str) -> &str {
    value.trim_end_matches('/')
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// `host` component as browsers see it: hostname plus non-default port
fn url_host(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

/// Derive the externally visible `scheme://host` of the current request
///
/// Reverse proxies rewrite only a subset of these headers, so proxy-supplied
/// trust signals win over the socket-level `host` header, and the raw request
/// URL is a last resort for local execution with no headers at all.
///
/// Resolution order:
/// 1. `x-forwarded-proto` + `x-forwarded-host` together
/// 2. `x-forwarded-host` alone, proto defaulting to `https`
/// 3. `host`, proto from `x-forwarded-proto` or a localhost heuristic
/// 4. scheme+host parsed out of `raw_request_url`
/// 5. the literal `http://localhost:3000`
///
/// Never fails; trailing slashes are stripped in every branch.
#[must_use]
pub fn resolve_request_origin(headers: &HeaderMap, raw_request_url: &str) -> String {
    let forwarded_proto = header_value(headers, "x-forwarded-proto");
    let forwarded_host = header_value(headers, "x-forwarded-host");
    let host = header_value(headers, "host");

    if let (Some(proto), Some(fwd_host)) = (forwarded_proto, forwarded_host) {
        return trim_trailing_slashes(&format!("{proto}://{fwd_host}")).to_owned();
    }

    if let Some(fwd_host) = forwarded_host {
        let proto = forwarded_proto.unwrap_or("https");
        return trim_trailing_slashes(&format!("{proto}://{fwd_host}")).to_owned();
    }

    if let Some(host) = host {
        let proto = forwarded_proto.unwrap_or_else(|| {
            if host.starts_with("localhost") || host.starts_with("127.") {
                "http"
            } else {
                "https"
            }
        });
        return trim_trailing_slashes(&format!("{proto}://{host}")).to_owned();
    }

    match Url::parse(raw_request_url) {
        Ok(url) => url_host(&url).map_or_else(
            || FALLBACK_ORIGIN.to_owned(),
            |host| {
                trim_trailing_slashes(&format!("{}://{host}", url.scheme())).to_owned()
            },
        ),
        Err(err) => {
            warn!(url = raw_request_url, %err, "failed to parse request URL, using fallback origin");
            FALLBACK_ORIGIN.to_owned()
        }
    }
}

/// Options controlling [`sanitize_redirect_target`]
#[derive(Debug, Clone)]
pub struct SanitizeOptions {
    /// Trusted origin used for same-host comparison of absolute URLs
    pub base_url: Option<String>,
    /// Path returned whenever the target cannot be trusted
    pub fallback_path: String,
    /// Custom scheme prefixes trusted as app-internal deep links
    pub allow_custom_schemes: Vec<String>,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            fallback_path: DEFAULT_DESTINATION.to_owned(),
            allow_custom_schemes: DEFAULT_ALLOWED_SCHEMES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }
}

enum HostCheck {
    /// Same host as the base URL, downgraded to path+query+fragment
    Relative(String),
    /// Target or base URL did not parse
    ParseFailed,
    /// Different host, or no base URL to compare against
    CrossHost,
}

fn downgrade_same_host(target: &str, base_url: Option<&str>) -> HostCheck {
    let Ok(target_url) = Url::parse(target) else {
        return HostCheck::ParseFailed;
    };
    let Some(base_url) = base_url.filter(|base| !base.is_empty()) else {
        return HostCheck::CrossHost;
    };
    let Ok(base) = Url::parse(base_url) else {
        return HostCheck::ParseFailed;
    };

    match (url_host(&target_url), url_host(&base)) {
        (Some(target_host), Some(base_host)) if target_host == base_host => {
            let mut relative = target_url.path().to_owned();
            if let Some(query) = target_url.query() {
                relative.push('?');
                relative.push_str(query);
            }
            if let Some(fragment) = target_url.fragment() {
                relative.push('#');
                relative.push_str(fragment);
            }
            HostCheck::Relative(relative)
        }
        _ => HostCheck::CrossHost,
    }
}

/// Validate and normalize a client-supplied redirect destination
///
/// Returns one of: an allow-listed custom-scheme URI, a root-relative path,
/// or the fallback path. The result is never an absolute `http(s)` URL on a
/// host other than `base_url`, and never a non-allow-listed scheme.
///
/// Decision order, each step terminal unless noted:
/// 1. empty after trimming → fallback
/// 2. allow-listed scheme prefix (case-insensitive) → trimmed original
/// 3. any other `scheme://` → fallback (blocks `javascript:`, `data:`, ...)
/// 4. starts with `/` → unchanged
/// 5. starts with `?` or `#` → fallback + target
/// 6. absolute `http(s)` URL on the same host as `base_url` → downgraded to
///    its path+query+fragment; cross-host or absent base falls through
/// 7. anything else → `/` + target with leading slashes stripped
///
/// The step 6 → 7 fallthrough for cross-host absolute URLs is deliberate:
/// `https://evil.com/x` becomes `/https://evil.com/x`, a relative path a
/// browser resolves against the trusted origin, not a navigable URL.
#[must_use]
pub fn sanitize_redirect_target(target: Option<&str>, options: &SanitizeOptions) -> String {
    let fallback_path = options.fallback_path.as_str();

    let Some(target) = target else {
        return fallback_path.to_owned();
    };
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return fallback_path.to_owned();
    }

    let lower = trimmed.to_lowercase();
    let allow_listed = options
        .allow_custom_schemes
        .iter()
        .filter(|scheme| !scheme.is_empty())
        .any(|scheme| lower.starts_with(&scheme.to_lowercase()));
    if allow_listed {
        return trimmed.to_owned();
    }

    if has_generic_scheme(trimmed) && !has_http_scheme(trimmed) {
        warn!(redirect_target = trimmed, "blocked unsupported redirect scheme");
        return fallback_path.to_owned();
    }

    if trimmed.starts_with('/') {
        return trimmed.to_owned();
    }

    if trimmed.starts_with('?') || trimmed.starts_with('#') {
        return format!("{fallback_path}{trimmed}");
    }

    if has_http_scheme(trimmed) {
        match downgrade_same_host(trimmed, options.base_url.as_deref()) {
            HostCheck::Relative(relative) => {
                return if relative.is_empty() {
                    fallback_path.to_owned()
                } else {
                    relative
                };
            }
            HostCheck::ParseFailed => {
                warn!(redirect_target = trimmed, "failed to parse redirect URL");
                return fallback_path.to_owned();
            }
            HostCheck::CrossHost => {}
        }
    }

    format!("/{}", trimmed.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            if let (Ok(name), Ok(value)) = (
                name.parse::<axum::http::HeaderName>(),
                HeaderValue::from_str(value),
            ) {
                map.insert(name, value);
            }
        }
        map
    }

    fn options() -> SanitizeOptions {
        SanitizeOptions::default()
    }

    fn options_with_base(base: &str) -> SanitizeOptions {
        SanitizeOptions {
            base_url: Some(base.to_owned()),
            ..SanitizeOptions::default()
        }
    }

    // ------------------------------------------------------------------
    // resolve_request_origin
    // ------------------------------------------------------------------

    #[test]
    fn origin_prefers_forwarded_proto_and_host() {
        let headers = headers(&[
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "app.example.com"),
            ("host", "internal:8080"),
        ]);
        assert_eq!(
            resolve_request_origin(&headers, "http://ignored/"),
            "https://app.example.com"
        );
    }

    #[test]
    fn origin_forwarded_host_alone_defaults_to_https() {
        let headers = headers(&[("x-forwarded-host", "app.example.com")]);
        assert_eq!(
            resolve_request_origin(&headers, "http://ignored/"),
            "https://app.example.com"
        );
    }

    #[test]
    fn origin_host_header_uses_forwarded_proto_when_present() {
        let headers = headers(&[("x-forwarded-proto", "http"), ("host", "app.example.com")]);
        assert_eq!(
            resolve_request_origin(&headers, "https://ignored/"),
            "http://app.example.com"
        );
    }

    #[test]
    fn origin_localhost_host_defaults_to_http() {
        let headers = headers(&[("host", "localhost:3000")]);
        assert_eq!(
            resolve_request_origin(&headers, "https://ignored/"),
            "http://localhost:3000"
        );
    }

    #[test]
    fn origin_loopback_ip_defaults_to_http() {
        let headers = headers(&[("host", "127.0.0.1:8080")]);
        assert_eq!(
            resolve_request_origin(&headers, ""),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn origin_public_host_defaults_to_https() {
        let headers = headers(&[("host", "storymagic.app")]);
        assert_eq!(resolve_request_origin(&headers, ""), "https://storymagic.app");
    }

    #[test]
    fn origin_falls_back_to_request_url() {
        let headers = HeaderMap::new();
        assert_eq!(
            resolve_request_origin(&headers, "https://app.example.com:8443/auth/callback?x=1"),
            "https://app.example.com:8443"
        );
    }

    #[test]
    fn origin_unparseable_url_yields_localhost() {
        let headers = HeaderMap::new();
        assert_eq!(
            resolve_request_origin(&headers, "/auth/callback/complete?token=abc"),
            "http://localhost:3000"
        );
        assert_eq!(resolve_request_origin(&headers, ""), "http://localhost:3000");
    }

    #[test]
    fn origin_empty_headers_are_ignored() {
        let headers = headers(&[("x-forwarded-host", ""), ("host", "app.example.com")]);
        assert_eq!(resolve_request_origin(&headers, ""), "https://app.example.com");
    }

    #[test]
    fn origin_strips_trailing_slashes() {
        let headers = headers(&[
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "app.example.com/"),
        ]);
        assert_eq!(resolve_request_origin(&headers, ""), "https://app.example.com");
    }

    // ------------------------------------------------------------------
    // sanitize_redirect_target: empty and trivial inputs
    // ------------------------------------------------------------------

    #[test]
    fn sanitize_empty_inputs_use_fallback() {
        assert_eq!(sanitize_redirect_target(None, &options()), "/dashboard");
        assert_eq!(sanitize_redirect_target(Some(""), &options()), "/dashboard");
        assert_eq!(
            sanitize_redirect_target(Some("   "), &options()),
            "/dashboard"
        );
    }

    #[test]
    fn sanitize_respects_custom_fallback() {
        let opts = SanitizeOptions {
            fallback_path: "/home".to_owned(),
            ..SanitizeOptions::default()
        };
        assert_eq!(sanitize_redirect_target(None, &opts), "/home");
    }

    // ------------------------------------------------------------------
    // sanitize_redirect_target: allow-listed custom schemes
    // ------------------------------------------------------------------

    #[test]
    fn sanitize_allows_custom_schemes_unchanged() {
        assert_eq!(
            sanitize_redirect_target(Some("atris://story/42"), &options()),
            "atris://story/42"
        );
        assert_eq!(
            sanitize_redirect_target(Some("storymagic://library"), &options()),
            "storymagic://library"
        );
    }

    #[test]
    fn sanitize_custom_scheme_match_is_case_insensitive() {
        assert_eq!(
            sanitize_redirect_target(Some("Atris://Story/42"), &options()),
            "Atris://Story/42"
        );
        assert_eq!(
            sanitize_redirect_target(Some("  STORYMAGIC://x  "), &options()),
            "STORYMAGIC://x"
        );
    }

    #[test]
    fn sanitize_unlisted_custom_scheme_is_blocked() {
        let opts = SanitizeOptions {
            allow_custom_schemes: vec!["atris://".to_owned()],
            ..SanitizeOptions::default()
        };
        assert_eq!(
            sanitize_redirect_target(Some("storymagic://x"), &opts),
            "/dashboard"
        );
    }

    // ------------------------------------------------------------------
    // sanitize_redirect_target: scheme blocking
    // ------------------------------------------------------------------

    #[test]
    fn sanitize_blocks_dangerous_schemes() {
        for target in [
            "javascript://alert(1)",
            "data://text/html,x",
            "file:///etc/passwd",
            "vbscript://msgbox",
            "ftp://evil.com/payload",
            "custom-app://deeplink",
        ] {
            assert_eq!(
                sanitize_redirect_target(Some(target), &options()),
                "/dashboard",
                "{target} should be blocked"
            );
        }
    }

    #[test]
    fn sanitize_never_returns_executable_scheme() {
        let inputs = [
            "javascript:alert(1)",
            "JAVASCRIPT://x",
            "data:text/html;base64,xxx",
            "vbscript:msgbox",
        ];
        for input in inputs {
            let result = sanitize_redirect_target(Some(input), &options());
            let lower = result.to_lowercase();
            assert!(
                !lower.starts_with("javascript:")
                    && !lower.starts_with("data:")
                    && !lower.starts_with("vbscript:"),
                "{input} produced {result}"
            );
        }
    }

    // ------------------------------------------------------------------
    // sanitize_redirect_target: relative inputs
    // ------------------------------------------------------------------

    #[test]
    fn sanitize_passes_root_relative_paths_through() {
        assert_eq!(
            sanitize_redirect_target(Some("/stories/42"), &options()),
            "/stories/42"
        );
        assert_eq!(
            sanitize_redirect_target(Some("/dashboard?tab=stories#recent"), &options()),
            "/dashboard?tab=stories#recent"
        );
    }

    #[test]
    fn sanitize_anchors_query_and_fragment_to_fallback() {
        assert_eq!(
            sanitize_redirect_target(Some("?tab=stories"), &options()),
            "/dashboard?tab=stories"
        );
        assert_eq!(
            sanitize_redirect_target(Some("#recent"), &options()),
            "/dashboard#recent"
        );
    }

    #[test]
    fn sanitize_prefixes_bare_paths() {
        assert_eq!(
            sanitize_redirect_target(Some("stories/42"), &options()),
            "/stories/42"
        );
    }

    // ------------------------------------------------------------------
    // sanitize_redirect_target: absolute http(s) URLs
    // ------------------------------------------------------------------

    #[test]
    fn sanitize_downgrades_same_host_absolute_url() {
        let opts = options_with_base("https://example.com");
        assert_eq!(
            sanitize_redirect_target(Some("https://example.com/foo?x=1"), &opts),
            "/foo?x=1"
        );
    }

    #[test]
    fn sanitize_same_host_keeps_fragment() {
        let opts = options_with_base("https://example.com");
        assert_eq!(
            sanitize_redirect_target(Some("https://example.com/foo?x=1#frag"), &opts),
            "/foo?x=1#frag"
        );
    }

    #[test]
    fn sanitize_same_host_root_becomes_root_path() {
        let opts = options_with_base("https://example.com");
        assert_eq!(
            sanitize_redirect_target(Some("https://example.com"), &opts),
            "/"
        );
    }

    #[test]
    fn sanitize_host_comparison_includes_port() {
        let opts = options_with_base("https://example.com:8443");
        assert_eq!(
            sanitize_redirect_target(Some("https://example.com:8443/foo"), &opts),
            "/foo"
        );
        // Different port is a different host: falls through to step 7.
        assert_eq!(
            sanitize_redirect_target(Some("https://example.com:9000/foo"), &opts),
            "/https://example.com:9000/foo"
        );
    }

    // Pins the cross-host fallthrough: the attacker URL is neutered into a
    // relative path rather than rejected outright. A browser resolves it
    // against the trusted origin, so it is not an open redirect.
    #[test]
    fn sanitize_cross_host_absolute_url_becomes_relative_path() {
        let opts = options_with_base("https://trusted.com");
        let result = sanitize_redirect_target(Some("https://evil.com/phish"), &opts);
        assert_eq!(result, "/https://evil.com/phish");
        assert!(result.starts_with('/'));
        assert!(!result.starts_with("//"));
    }

    #[test]
    fn sanitize_absolute_url_without_base_falls_through() {
        let result = sanitize_redirect_target(Some("https://example.com/foo"), &options());
        assert_eq!(result, "/https://example.com/foo");
    }

    #[test]
    fn sanitize_unparseable_base_url_uses_fallback() {
        let opts = options_with_base("not a url");
        assert_eq!(
            sanitize_redirect_target(Some("https://example.com/foo"), &opts),
            "/dashboard"
        );
    }

    #[test]
    fn sanitize_unparseable_target_url_uses_fallback() {
        // Matches ^https?:// but has no host, so URL parsing fails.
        assert_eq!(
            sanitize_redirect_target(Some("http://"), &options()),
            "/dashboard"
        );
    }

    #[test]
    fn sanitize_result_is_never_protocol_relative() {
        // Leading slashes collapse to a single one, so "//evil.com" cannot
        // survive as a protocol-relative URL.
        let opts = options_with_base("https://trusted.com");
        for target in ["https://evil.com//x", "http://evil.com/phish"] {
            let result = sanitize_redirect_target(Some(target), &opts);
            assert!(!result.starts_with("//"), "{target} produced {result}");
        }
    }
}
