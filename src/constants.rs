// ABOUTME: Application constants for cookie names, defaults, and provider allow-lists
// ABOUTME: Centralizes the compatibility surface shared with downstream cookie consumers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

//! Application-wide constants
//!
//! Cookie names and their 7-day TTL are a compatibility surface: the
//! StoryMagic app reads these cookies downstream, so they must not change
//! without coordinating both sides.

/// Session cookie names written by the callback handler
pub mod cookie_names {
    /// Primary session token cookie
    pub const TOKEN: &str = "storymagic_token";
    /// Refresh token cookie, present when the backend supplies one
    pub const REFRESH_TOKEN: &str = "storymagic_refresh_token";
    /// OAuth provider that issued the session
    pub const PROVIDER: &str = "storymagic_provider";
    /// Provider mirror consumed by the refresh flow
    pub const REFRESH_PROVIDER: &str = "refresh_provider";
}

/// Session cookie lifetime in seconds (7 days)
pub const ONE_WEEK_SECONDS: u64 = 60 * 60 * 24 * 7;

/// Default Atris API base URL when `ATRIS_API_BASE_URL` is unset
pub const DEFAULT_ATRIS_API_BASE_URL: &str = "https://api.atris.ai/api";

/// App base URL for local execution; the origin resolver falls back to
/// this when no header or request URL yields a scheme+host
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";

/// Post-login landing path used when no destination survives sanitization
pub const DEFAULT_DESTINATION: &str = "/dashboard";

/// Custom URI scheme prefixes trusted as app-internal deep links
pub const DEFAULT_ALLOWED_SCHEMES: &[&str] = &["atris://", "storymagic://"];

/// OAuth providers the login endpoint accepts
pub const SUPPORTED_PROVIDERS: &[&str] = &["google", "github", "apple"];

/// Product metadata forwarded to Atris on login initiation
pub mod app_metadata {
    /// Product name
    pub const NAME: &str = "StoryMagic";
    /// Owning platform
    pub const OWNER: &str = "Atris OS";
}

/// Environment variable names consumed by [`crate::config::ServerConfig::from_env`]
pub mod env_vars {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Deployment environment (development, production, testing)
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Atris backend API base URL
    pub const ATRIS_API_BASE_URL: &str = "ATRIS_API_BASE_URL";
    /// Externally configured app base URL, overrides request-derived origins
    pub const APP_BASE_URL: &str = "APP_BASE_URL";
    /// Comma-separated custom scheme prefixes allowed as redirect targets
    pub const ALLOWED_REDIRECT_SCHEMES: &str = "ALLOWED_REDIRECT_SCHEMES";
}
