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

//! Data-plane layer.
//!
//! Carries accepted state changes from the broker thread to subscribers. The
//! ingress listener commits changes to the store and hands snapshots to the
//! scheduler bridge; the dispatcher task owns the subscriber registry and
//! performs every attach, detach and broadcast in queue order.
//!
//! ```
//! use scan_tracker::{BrokerError, BrokerTransport, FrameListener, ScanStatus, ScanTracker};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct LoopbackTransport(Mutex<Option<Arc<dyn FrameListener>>>);
//!
//! #[async_trait::async_trait]
//! impl BrokerTransport for LoopbackTransport {
//!     async fn subscribe(
//!         &self,
//!         _destination: &str,
//!         listener: Arc<dyn FrameListener>,
//!     ) -> Result<(), BrokerError> {
//!         *self.0.lock().unwrap() = Some(listener);
//!         Ok(())
//!     }
//!
//!     async fn disconnect(&self) -> Result<(), BrokerError> {
//!         Ok(())
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let transport = Arc::new(LoopbackTransport::default());
//! let tracker = ScanTracker::new(transport.clone(), "public.worker.event").await.unwrap();
//! let mut updates = tracker.subscribe();
//!
//! let listener = transport.0.lock().unwrap().clone().unwrap();
//! std::thread::spawn(move || {
//!     listener.on_message(
//!         br#"{"name":"start","doc":{"uid":"abc123","data_session_directory":"/data/test","scan_file":"scan001"}}"#,
//!     );
//! });
//!
//! let snapshot = updates.recv().await.unwrap();
//! assert_eq!(snapshot.status, ScanStatus::Running);
//! tracker.disconnect().await;
//! # });
//! ```

pub(crate) mod bridge;
pub(crate) mod dispatcher;
pub(crate) mod ingress_listener;
pub(crate) mod registry;
pub(crate) mod subscription;
