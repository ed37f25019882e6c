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

//! Scan-state layer.
//!
//! Owns the tracked record, the decoding of inbound documents and the pure
//! transition rules between them. Nothing in this layer knows about threads,
//! brokers or subscribers; the store's lock is the only synchronization in
//! the crate that is shared between the broker thread and consumers.
//!
//! ```
//! use scan_tracker::state::{ScanEvent, ScanStateStore, ScanStatus};
//!
//! let store = ScanStateStore::new();
//! let start = ScanEvent::from_slice(
//!     br#"{"name":"start","doc":{"uid":"abc123","data_session_directory":"/data/test","scan_file":"scan001"}}"#,
//! )
//! .unwrap();
//!
//! let snapshot = store.apply(&start).into_snapshot().unwrap();
//! assert_eq!(snapshot.status, ScanStatus::Running);
//! assert_eq!(snapshot.filepath.as_deref(), Some("/data/test/scan001.nxs"));
//! ```

pub mod event;
pub mod machine;
pub mod model;
pub mod store;

pub use event::{ScanEvent, StartDoc, StopDoc};
pub use machine::{transition, HoldReason, Transition};
pub use model::{LatestScan, ScanStatus};
pub use store::ScanStateStore;
