// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables once at startup into an injected ServerConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

//! Environment-based configuration, loaded once at process start
//!
//! Handlers never read ambient process state: everything they need is
//! captured in [`ServerConfig`] and injected through shared server resources.

use crate::constants::{env_vars, DEFAULT_ALLOWED_SCHEMES, DEFAULT_ATRIS_API_BASE_URL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Deployment environment, drives the cookie `Secure` flag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development, cookies sent over plain HTTP
    #[default]
    Development,
    /// Production, cookies marked `Secure`
    Production,
    /// Automated testing
    Testing,
}

impl Environment {
    /// Parse from string with fallback to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Server configuration assembled from the environment at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Atris backend API base URL, trailing slashes stripped
    pub atris_api_base_url: String,
    /// Externally configured app base URL; when set it overrides
    /// request-derived origins during login initiation
    pub app_base_url: Option<String>,
    /// Custom scheme prefixes accepted as redirect targets
    pub allowed_redirect_schemes: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `HTTP_PORT` is set but not a valid port number
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var(env_vars::HTTP_PORT) {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid {}: {raw}", env_vars::HTTP_PORT))?,
            Err(_) => 8080,
        };

        let environment = env::var(env_vars::ENVIRONMENT)
            .map(|raw| Environment::from_str_or_default(&raw))
            .unwrap_or_default();

        let atris_api_base_url = env::var(env_vars::ATRIS_API_BASE_URL)
            .ok()
            .map_or_else(
                || DEFAULT_ATRIS_API_BASE_URL.to_owned(),
                |raw| trim_trailing_slashes(&raw),
            );

        let app_base_url = env::var(env_vars::APP_BASE_URL)
            .ok()
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty())
            .map(|raw| trim_trailing_slashes(&raw));

        let allowed_redirect_schemes = env::var(env_vars::ALLOWED_REDIRECT_SCHEMES)
            .ok()
            .map_or_else(default_allowed_schemes, |raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            });

        Ok(Self {
            http_port,
            environment,
            atris_api_base_url,
            app_base_url,
            allowed_redirect_schemes,
        })
    }

    /// One-line configuration summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} environment={} atris_api={} app_base_url={}",
            self.http_port,
            self.environment,
            self.atris_api_base_url,
            self.app_base_url.as_deref().unwrap_or("<from request>"),
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            environment: Environment::Development,
            atris_api_base_url: DEFAULT_ATRIS_API_BASE_URL.to_owned(),
            app_base_url: None,
            allowed_redirect_schemes: default_allowed_schemes(),
        }
    }
}

fn default_allowed_schemes() -> Vec<String> {
    DEFAULT_ALLOWED_SCHEMES
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

fn trim_trailing_slashes(value: &str) -> String {
    value.trim_end_matches('/').to_owned()
}
