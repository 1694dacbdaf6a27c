// ABOUTME: Session cookie construction for the authentication callback and logout flows
// ABOUTME: Produces Set-Cookie values with the fixed attribute set downstream readers expect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

//! Session cookie helpers
//!
//! All session cookies share one attribute set: `HttpOnly`, `SameSite=Lax`,
//! `Path=/`, a 7-day `Max-Age`, and `Secure` in production. Logout reuses
//! the same base attributes with an empty value and `Max-Age=0`.
//!
//! Values are percent-encoded before serialization. Token and provider
//! values arrive percent-decoded from an attacker-craftable callback query,
//! so a raw `;` in a value would otherwise smuggle extra cookie attributes;
//! downstream readers already expect encoded values.

use crate::constants::ONE_WEEK_SECONDS;
use crate::errors::AppError;
use axum::http::{header::SET_COOKIE, HeaderValue};
use axum::response::Response;

/// Build a session cookie value with the standard attribute set
#[must_use]
pub fn issue(name: &str, value: &str, secure: bool) -> String {
    build(name, value, ONE_WEEK_SECONDS, secure)
}

/// Build a clearing cookie: empty value, immediate expiry
#[must_use]
pub fn clear(name: &str) -> String {
    build(name, "", 0, false)
}

fn build(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax",
        urlencoding::encode(value)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Append a cookie to a response's `Set-Cookie` headers
///
/// # Errors
/// Returns an error if the cookie value contains bytes invalid in a header
pub fn append(response: &mut Response, cookie: &str) -> Result<(), AppError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|err| AppError::internal(format!("invalid cookie value: {err}")))?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(())
}
