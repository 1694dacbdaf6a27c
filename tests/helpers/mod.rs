// ABOUTME: Test helper module exports for integration tests
// ABOUTME: Provides axum request builders shared across test files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

pub mod axum_test;
