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

use thiserror::Error;

/// Failures raised by a broker session or its wire codec.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("unable to reach broker at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("broker rejected the connection: {message}")]
    Rejected { message: String },
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("STOMP protocol violation: {0}")]
    Protocol(String),
    #[error("broker session is closed")]
    SessionClosed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures that prevent a [`crate::ScanTracker`] from being constructed.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to connect to the broker")]
    Connect(#[source] BrokerError),
    #[error("failed to subscribe to {destination}")]
    Subscribe {
        destination: String,
        #[source]
        source: BrokerError,
    },
    #[error("scan tracker must be constructed inside a Tokio runtime")]
    NoRuntime,
}
