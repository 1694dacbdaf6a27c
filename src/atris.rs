// ABOUTME: Outbound HTTP client for the Atris backend login-initiation endpoint
// ABOUTME: Single best-effort request with no retry, backend errors relayed verbatim
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

//! Client for the Atris backend API
//!
//! The gateway performs exactly one outbound call: forwarding a
//! login-initiation request to `POST {base}/auth/login`. Failures are
//! surfaced verbatim to the caller; there is no retry policy.

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Fallback detail when the backend error body carries none
const REJECTION_DETAIL: &str = "Atris rejected the authentication request.";

/// Login-initiation payload sent to Atris
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInitiationRequest {
    /// OAuth provider the user selected
    pub provider: String,
    /// Backend-facing OAuth callback URL
    pub redirect_uri: String,
    /// Gateway completion-callback URL the backend redirects to afterwards
    pub next: String,
    /// Always `redirect`; the backend answers with a provider URL to follow
    pub response_mode: String,
    /// Product identifier for backend-side attribution
    pub product: String,
}

/// Client for the Atris backend API
#[derive(Debug, Clone)]
pub struct AtrisClient {
    base_url: String,
    http: reqwest::Client,
}

impl AtrisClient {
    /// Create a client rooted at the given API base URL
    #[must_use]
    pub fn new(base_url: String, http: reqwest::Client) -> Self {
        Self { base_url, http }
    }

    /// Base URL this client targets
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward a login-initiation request to the backend
    ///
    /// Returns the backend's JSON body on success. Non-2xx responses become
    /// [`AppError`]s that keep the backend's status and `detail` message.
    ///
    /// # Errors
    /// Returns an error when the backend is unreachable or rejects the request
    pub async fn initiate_login(
        &self,
        request: &LoginInitiationRequest,
    ) -> Result<Value, AppError> {
        let endpoint = format!("{}/auth/login", self.base_url);
        debug!(provider = %request.provider, %endpoint, "initiating login with Atris");

        let response = self.http.post(&endpoint).json(request).send().await?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        if status.is_success() {
            Ok(body)
        } else {
            let detail = body
                .get("detail")
                .and_then(Value::as_str)
                .unwrap_or(REJECTION_DETAIL);
            Err(AppError::external_service(status, detail))
        }
    }
}
