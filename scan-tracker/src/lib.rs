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

//! # scan-tracker
//!
//! `scan-tracker` follows the start/stop documents a data-acquisition system
//! publishes on a message-broker topic, keeps the most recent scan as a single
//! [`LatestScan`] record and pushes every change to any number of subscribers.
//!
//! ```no_run
//! use scan_tracker::{BrokerConfig, ScanTracker};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let tracker = ScanTracker::connect(&BrokerConfig::default()).await.unwrap();
//! println!("current scan: {:?}", tracker.get_latest());
//!
//! let mut updates = tracker.subscribe();
//! while let Some(scan) = updates.recv().await {
//!     println!("{} -> {}", scan.uuid.unwrap_or_default(), scan.status);
//! }
//! # });
//! ```
//!
//! ## State rules
//!
//! - `start` with `uid`, `data_session_directory` and `scan_file` replaces the
//!   record with a running scan at `{data_session_directory}/{scan_file}.nxs`.
//! - `stop` whose `run_start` names the running scan ends it as `finished` when
//!   `exit_status` is exactly `"success"`, `failed` otherwise.
//! - Anything else, including malformed bodies, leaves the record alone and is
//!   not broadcast.
//!
//! ## Internal architecture map
//!
//! - Broker: transport contract and the STOMP session thread
//! - State: record model, document decoding, transition rules, locked store
//! - Data plane: ingress listener, scheduler bridge, dispatcher and subscriptions
//! - Runtime: session thread and runtime ownership
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events/spans and does not unconditionally initialize a global
//! subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

pub mod broker;
pub use broker::{normalize_destination, BrokerConfig, BrokerTransport, FrameListener};

mod data_plane;
pub use data_plane::registry::SubscriberId;
pub use data_plane::subscription::ScanSubscription;

mod error;
pub use error::{BrokerError, TrackerError};

#[doc(hidden)]
pub mod observability;
mod runtime;

pub mod state;
pub use state::{LatestScan, ScanStatus};

mod tracker;
pub use tracker::ScanTracker;
