// ABOUTME: Server binary for the StoryMagic authentication gateway
// ABOUTME: Loads configuration, initializes logging, and serves the HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

//! # StoryMagic Gateway Server Binary
//!
//! Starts the authentication gateway with configuration loaded from the
//! environment and structured logging.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use storymagic_gateway::{
    config::ServerConfig,
    logging,
    resources::ServerResources,
    routes::{AuthRoutes, HealthRoutes},
};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Parser)]
#[command(name = "storymagic-gateway")]
#[command(about = "StoryMagic authentication gateway for the Atris backend")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting StoryMagic gateway");
    info!("{}", config.summary());

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(config));

    let app = axum::Router::new()
        .merge(HealthRoutes::routes())
        .merge(AuthRoutes::routes(resources))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("HTTP server listening on port {port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to install shutdown signal handler");
    }
    info!("shutdown signal received");
}
