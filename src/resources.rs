// ABOUTME: Shared server resources injected into route handlers via axum state
// ABOUTME: Holds the parsed configuration and the outbound Atris client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

//! Centralized server resources
//!
//! Built once at startup and shared through an `Arc`, so handlers receive
//! everything they need without reading ambient process state.

use crate::atris::AtrisClient;
use crate::config::ServerConfig;

/// Shared resources for all route handlers
#[derive(Debug, Clone)]
pub struct ServerResources {
    /// Parsed configuration, immutable after startup
    pub config: ServerConfig,
    /// Client for the Atris backend API
    pub atris: AtrisClient,
}

impl ServerResources {
    /// Assemble resources from configuration
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let atris = AtrisClient::new(config.atris_api_base_url.clone(), reqwest::Client::new());
        Self { config, atris }
    }
}
