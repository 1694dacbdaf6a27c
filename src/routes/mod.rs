// ABOUTME: Route module organization for the StoryMagic gateway HTTP endpoints
// ABOUTME: Groups route definitions by domain with thin handlers delegating to library code
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

//! Route modules for the gateway
//!
//! Each domain module contains route definitions and thin handler functions;
//! the security-sensitive logic lives in [`crate::urls`] and [`crate::cookies`].

/// Authentication routes: login initiation, callback completion, logout
pub mod auth;
/// Health check routes for monitoring infrastructure
pub mod health;

pub use auth::{AuthRoutes, CallbackParams, LoginRequest};
pub use health::HealthRoutes;
