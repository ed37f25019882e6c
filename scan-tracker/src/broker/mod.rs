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

//! Broker-session layer.
//!
//! The tracker only needs two things from a broker: deliver every inbound
//! message body to a listener on a thread of the session's own, and accept a
//! subscribe/disconnect contract. [`BrokerTransport`] captures that contract;
//! [`stomp::StompSession`] is the implementation used in deployments.

pub mod stomp;

use crate::error::BrokerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Namespace prepended to bare topic names.
pub const TOPIC_PREFIX: &str = "/topic/";

/// Receives raw message bodies from a broker session.
///
/// Called on the session's thread, never concurrently with itself. An
/// implementation must not block for long and must not panic on bad input.
pub trait FrameListener: Send + Sync {
    fn on_message(&self, body: &[u8]);
}

#[async_trait]
pub trait BrokerTransport: Send + Sync {
    /// Starts delivering messages published on `destination` to `listener`.
    async fn subscribe(
        &self,
        destination: &str,
        listener: Arc<dyn FrameListener>,
    ) -> Result<(), BrokerError>;

    /// Gracefully closes the session.
    async fn disconnect(&self) -> Result<(), BrokerError>;
}

/// Turns a configured destination into a fully qualified one.
///
/// Values starting with `/` are used verbatim, anything else is treated as a
/// bare topic name.
pub fn normalize_destination(destination: &str) -> String {
    if destination.starts_with('/') {
        destination.to_string()
    } else {
        format!("{TOPIC_PREFIX}{destination}")
    }
}

/// Connection settings for the broker carrying scan documents.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub destination: String,
    pub connect_timeout_secs: u64,
}

impl BrokerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 61613,
            username: "guest".to_string(),
            password: "guest".to_string(),
            destination: "public.worker.event".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

impl Debug for BrokerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("destination", &self.destination)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_destination, BrokerConfig};

    #[test]
    fn bare_topic_is_prefixed() {
        assert_eq!(
            normalize_destination("public.worker.event"),
            "/topic/public.worker.event"
        );
    }

    #[test]
    fn qualified_destination_is_used_verbatim() {
        assert_eq!(normalize_destination("/queue/scans"), "/queue/scans");
        assert_eq!(normalize_destination("/topic/x"), "/topic/x");
    }

    #[test]
    fn debug_output_hides_password() {
        let config = BrokerConfig {
            password: "hunter2".to_string(),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: BrokerConfig =
            serde_json::from_str(r#"{"host": "broker.example", "port": 61614}"#)
                .expect("partial config parses");

        assert_eq!(config.address(), "broker.example:61614");
        assert_eq!(config.username, "guest");
        assert_eq!(config.destination, "public.worker.event");
    }
}
