// ABOUTME: Authentication route handlers for login initiation, OAuth callback, and logout
// ABOUTME: Thin axum handlers that delegate origin and redirect validation to the urls module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

//! Authentication routes
//!
//! The callback handler is the trust boundary of the gateway: the `token`,
//! `provider`, and `destination` query parameters all arrive via a publicly
//! reachable URL, echoed through the OAuth provider. Destination validation
//! is delegated to [`crate::urls::sanitize_redirect_target`].

use crate::{
    atris::LoginInitiationRequest,
    constants::{app_metadata, cookie_names, DEFAULT_DESTINATION, SUPPORTED_PROVIDERS},
    cookies,
    errors::AppError,
    resources::ServerResources,
    urls::{resolve_request_origin, sanitize_redirect_target, SanitizeOptions},
};
use axum::{
    extract::{Query, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Query parameters of the completion callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// Session token issued by the backend; required
    pub token: Option<String>,
    /// Refresh token, when the backend supplies one
    pub refresh_token: Option<String>,
    /// OAuth provider that completed the login
    pub provider: Option<String>,
    /// Caller-supplied redirect destination, sanitized before use
    pub destination: Option<String>,
}

/// Login initiation request body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    /// OAuth provider to start a login with
    #[serde(default)]
    pub provider: Option<String>,
}

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/login", post(initiate_login))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/callback/complete", get(complete_callback))
            .with_state(resources)
    }
}

/// Handle the OAuth completion callback
///
/// Missing token is the sole failure path: a silent redirect back to the
/// login page, no cookies. Otherwise the destination is sanitized against
/// the resolved origin and all session cookies are issued unconditionally.
async fn complete_callback(
    State(resources): State<Arc<ServerResources>>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, AppError> {
    let origin = resolve_request_origin(&headers, &raw_request_url(&uri));

    let Some(token) = params.token.as_deref().filter(|t| !t.is_empty()) else {
        debug!("callback missing token, redirecting to login");
        let location = format!("{origin}/auth/login?error=missing_token");
        return redirect_response(&location);
    };

    let options = SanitizeOptions {
        base_url: Some(origin.clone()),
        fallback_path: DEFAULT_DESTINATION.to_owned(),
        allow_custom_schemes: resources.config.allowed_redirect_schemes.clone(),
    };
    let destination = sanitize_redirect_target(params.destination.as_deref(), &options);
    let redirect_url = if destination.starts_with("http") {
        destination
    } else {
        format!("{origin}{destination}")
    };

    let mut response = redirect_response(&redirect_url)?;
    let secure = resources.config.environment.is_production();

    cookies::append(
        &mut response,
        &cookies::issue(cookie_names::TOKEN, token, secure),
    )?;

    if let Some(refresh_token) = params.refresh_token.as_deref().filter(|t| !t.is_empty()) {
        cookies::append(
            &mut response,
            &cookies::issue(cookie_names::REFRESH_TOKEN, refresh_token, secure),
        )?;
    }

    if let Some(provider) = params.provider.as_deref().filter(|p| !p.is_empty()) {
        cookies::append(
            &mut response,
            &cookies::issue(cookie_names::PROVIDER, provider, secure),
        )?;
        cookies::append(
            &mut response,
            &cookies::issue(cookie_names::REFRESH_PROVIDER, provider, secure),
        )?;
    }

    info!(
        provider = params.provider.as_deref().unwrap_or("unknown"),
        "login callback completed, session cookies issued"
    );
    Ok(response)
}

/// Start an OAuth login by forwarding the request to Atris
async fn initiate_login(
    State(resources): State<Arc<ServerResources>>,
    headers: HeaderMap,
    uri: Uri,
    body: Option<Json<LoginRequest>>,
) -> Result<Response, AppError> {
    let provider = body
        .and_then(|Json(request)| request.provider)
        .unwrap_or_default()
        .to_lowercase();

    if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
        return Err(AppError::invalid_input(
            "Unsupported authentication provider requested.",
        ));
    }

    let origin = resolve_app_base_url(&resources, &headers, &raw_request_url(&uri));
    let options = SanitizeOptions {
        base_url: Some(origin.clone()),
        fallback_path: DEFAULT_DESTINATION.to_owned(),
        allow_custom_schemes: resources.config.allowed_redirect_schemes.clone(),
    };
    let destination = sanitize_redirect_target(Some(DEFAULT_DESTINATION), &options);

    let complete_callback_url = format!(
        "{origin}/api/auth/callback/complete?destination={}",
        urlencoding::encode(&destination)
    );
    let payload = LoginInitiationRequest {
        provider,
        redirect_uri: format!("{}/auth/callback", resources.atris.base_url()),
        next: complete_callback_url,
        response_mode: "redirect".to_owned(),
        product: app_metadata::NAME.to_owned(),
    };

    let backend_response = resources.atris.initiate_login(&payload).await?;
    Ok(Json(backend_response).into_response())
}

/// Terminate the session by clearing the token cookies
async fn logout() -> Result<Response, AppError> {
    let mut response = Json(serde_json::json!({ "status": "terminated" })).into_response();
    cookies::append(&mut response, &cookies::clear(cookie_names::TOKEN))?;
    cookies::append(&mut response, &cookies::clear(cookie_names::REFRESH_TOKEN))?;
    Ok(response)
}

/// Raw request URL handed to the origin resolver
///
/// Axum exposes the origin-form request target (path and query) for
/// typical HTTP/1.1 requests, so the resolver's URL-parse step only
/// succeeds for absolute-form targets; a request with no usable headers
/// degrades to the resolver's localhost fallback.
fn raw_request_url(uri: &Uri) -> String {
    uri.to_string()
}

/// 307 redirect without the panic path of `axum::response::Redirect`,
/// since the location may carry percent-decoded caller input
fn redirect_response(location: &str) -> Result<Response, AppError> {
    let value = HeaderValue::from_str(location)
        .map_err(|err| AppError::internal(format!("invalid redirect location: {err}")))?;
    let mut response = StatusCode::TEMPORARY_REDIRECT.into_response();
    response.headers_mut().insert(LOCATION, value);
    Ok(response)
}

/// Resolve the app base URL: configuration wins over request-derived origins
fn resolve_app_base_url(
    resources: &ServerResources,
    headers: &HeaderMap,
    raw_url: &str,
) -> String {
    resources
        .config
        .app_base_url
        .clone()
        .unwrap_or_else(|| resolve_request_origin(headers, raw_url))
}
