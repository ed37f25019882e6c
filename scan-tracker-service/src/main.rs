/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod config;
mod http;

use crate::config::{Args, ServiceConfig};
use crate::http::AppState;
use anyhow::{Context, Result};
use clap::Parser;
use scan_tracker::ScanTracker;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// `info` unless `directives` (normally `RUST_LOG`) says otherwise.
fn env_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt().with_env_filter(env_filter(&directives)).init();

    let config = ServiceConfig::resolve(&args)?;
    info!(
        broker = ?config.broker,
        http = %config.http.bind_address(),
        "starting scan tracker service"
    );

    let tracker = Arc::new(
        ScanTracker::connect(&config.broker)
            .await
            .with_context(|| format!("connecting to broker at {}", config.broker.address()))?,
    );

    let listener = TcpListener::bind(config.http.bind_address())
        .await
        .with_context(|| format!("binding {}", config.http.bind_address()))?;
    info!("listening on http://{}", config.http.bind_address());

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(err = %err, "unable to listen for ctrl-c, shutting down");
            }
            info!("shutdown requested");
            shutdown.cancel();
        }
    });

    let state = AppState {
        tracker: tracker.clone(),
        shutdown: shutdown.clone(),
    };
    let served = axum::serve(listener, http::router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;

    tracker.disconnect().await;
    served.context("HTTP server failed")?;
    Ok(())
}
