// ABOUTME: Main library entry point for the StoryMagic authentication gateway
// ABOUTME: Provides OAuth login initiation, callback completion, and session cookie handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

#![deny(unsafe_code)]

//! # StoryMagic Gateway
//!
//! A thin authentication gateway that sits in front of the external Atris
//! backend API. It initiates OAuth logins against Atris, receives the
//! completion callback, validates the caller-supplied redirect destination,
//! and issues the session cookies the StoryMagic app reads downstream.
//!
//! ## Architecture
//!
//! - **urls**: request-origin resolution and redirect-target sanitization,
//!   the security-sensitive core of the callback flow
//! - **routes**: thin axum handlers for login, callback completion, logout,
//!   and health checks
//! - **atris**: outbound client for the Atris login-initiation endpoint
//! - **config**: explicit configuration loaded once at process start and
//!   injected into handlers

/// Outbound client for the Atris backend login endpoint
pub mod atris;

/// Configuration management loaded from the environment at startup
pub mod config;

/// Application constants: cookie names, defaults, provider allow-list
pub mod constants;

/// Session cookie construction and clearing
pub mod cookies;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// Structured logging configuration
pub mod logging;

/// Shared server resources injected into route handlers
pub mod resources;

/// HTTP route handlers organized by domain
pub mod routes;

/// Request-origin resolution and redirect-target sanitization
pub mod urls;
