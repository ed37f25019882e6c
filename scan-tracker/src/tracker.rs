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

use crate::broker::stomp::{StompOptions, StompSession};
use crate::broker::{normalize_destination, BrokerConfig, BrokerTransport, FrameListener};
use crate::data_plane::bridge::SchedulerBridge;
use crate::data_plane::dispatcher::BroadcastDispatcher;
use crate::data_plane::ingress_listener::ScanIngressListener;
use crate::data_plane::subscription::ScanSubscription;
use crate::error::TrackerError;
use crate::observability::events;
use crate::state::{LatestScan, ScanStateStore};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

const COMPONENT: &str = "scan_tracker";

/// Tracks the most recent scan published on a broker topic and fans every
/// change out to subscribers.
///
/// Inbound messages are handled on the broker session's own thread. Each
/// accepted change is committed under the store lock and then handed to a
/// dispatcher task on the runtime that constructed the tracker, which pushes
/// a copy to every subscriber.
pub struct ScanTracker {
    destination: String,
    store: Arc<ScanStateStore>,
    bridge: SchedulerBridge,
    transport: Arc<dyn BrokerTransport>,
    disconnected: AtomicBool,
}

impl ScanTracker {
    /// Opens a STOMP session described by `config` and starts tracking its
    /// destination.
    pub async fn connect(config: &BrokerConfig) -> Result<Self, TrackerError> {
        let session = StompSession::connect(StompOptions::from(config))
            .await
            .map_err(TrackerError::Connect)?;
        Self::new(Arc::new(session), &config.destination).await
    }

    /// Starts tracking `destination` on an already connected transport.
    ///
    /// Must be awaited inside a Tokio runtime; that runtime hosts the fan-out.
    /// On failure the transport is disconnected and no tracker exists.
    pub async fn new(
        transport: Arc<dyn BrokerTransport>,
        destination: &str,
    ) -> Result<Self, TrackerError> {
        let runtime = Handle::try_current().map_err(|_| TrackerError::NoRuntime)?;
        let destination = normalize_destination(destination);

        let store = Arc::new(ScanStateStore::new());
        let bridge = BroadcastDispatcher::spawn(&runtime);
        let listener: Arc<dyn FrameListener> =
            Arc::new(ScanIngressListener::new(store.clone(), bridge.clone()));

        if let Err(source) = transport.subscribe(&destination, listener).await {
            if let Err(err) = transport.disconnect().await {
                debug!(
                    component = COMPONENT,
                    err = %err,
                    "disconnect after failed subscribe also failed"
                );
            }
            return Err(TrackerError::Subscribe {
                destination,
                source,
            });
        }

        info!(
            event = events::TRACKER_CONNECTED,
            component = COMPONENT,
            destination = %destination,
            "scan tracker connected"
        );

        Ok(Self {
            destination,
            store,
            bridge,
            transport,
            disconnected: AtomicBool::new(false),
        })
    }

    /// Returns a copy of the current record.
    pub fn get_latest(&self) -> LatestScan {
        self.store.read()
    }

    /// Opens a stream of every snapshot broadcast from now on.
    pub fn subscribe(&self) -> ScanSubscription {
        ScanSubscription::open(&self.bridge)
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn is_connected(&self) -> bool {
        !self.disconnected.load(Ordering::Acquire)
    }

    /// Closes the broker session. Later calls are no-ops and failures are
    /// only logged.
    pub async fn disconnect(&self) {
        if self.disconnected.swap(true, Ordering::AcqRel) {
            debug!(component = COMPONENT, "scan tracker already disconnected");
            return;
        }

        match self.transport.disconnect().await {
            Ok(()) => info!(
                event = events::TRACKER_DISCONNECTED,
                component = COMPONENT,
                destination = %self.destination,
                "scan tracker disconnected"
            ),
            Err(err) => warn!(
                event = events::TRACKER_DISCONNECTED,
                component = COMPONENT,
                destination = %self.destination,
                err = %err,
                "broker disconnect failed, session abandoned"
            ),
        }
    }
}

impl Debug for ScanTracker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanTracker")
            .field("destination", &self.destination)
            .field("connected", &self.is_connected())
            .finish()
    }
}
