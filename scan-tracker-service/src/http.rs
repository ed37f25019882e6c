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

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use futures::{Stream, StreamExt};
use scan_tracker::{LatestScan, ScanTracker};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const SCAN_EVENT: &str = "scan";
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<ScanTracker>,
    /// Cancelled on shutdown so open event streams end.
    pub shutdown: CancellationToken,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scan/latest", get(latest))
        .route("/scan/events", get(events))
        .with_state(state)
}

async fn index() -> Json<Value> {
    Json(json!({
        "INFO": "Scan tracker: GET /scan/latest for the current scan, /scan/events to follow changes."
    }))
}

async fn latest(State(state): State<AppState>) -> Json<LatestScan> {
    Json(state.tracker.get_latest())
}

/// Streams every broadcast snapshot as a `scan` event until the client goes
/// away or the service shuts down. Either way the subscription is dropped and
/// thereby detached.
async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscription = state.tracker.subscribe();
    debug!(subscriber = %subscription.id(), "SSE client attached");

    let shutdown = state.shutdown.clone();
    let stream = subscription
        .take_until(async move { shutdown.cancelled().await })
        .map(|scan| Event::default().event(SCAN_EVENT).json_data(scan));
    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
