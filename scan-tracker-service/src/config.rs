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

use clap::Parser;
use scan_tracker::BrokerConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },
}

#[derive(Parser, Debug, Default)]
#[command(version, about = "Serves the latest scan seen on a STOMP broker", long_about = None)]
pub struct Args {
    /// JSON5 configuration file
    #[arg(short, long, env = "SCAN_TRACKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP listen address [default: 0.0.0.0]
    #[arg(long, env = "SCAN_TRACKER_HOST")]
    pub host: Option<String>,

    /// HTTP listen port [default: 8000]
    #[arg(short, long, env = "SCAN_TRACKER_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "SCAN_TRACKER_BROKER_HOST")]
    pub broker_host: Option<String>,

    #[arg(long, env = "SCAN_TRACKER_BROKER_PORT")]
    pub broker_port: Option<u16>,

    #[arg(long, env = "SCAN_TRACKER_BROKER_USER")]
    pub broker_user: Option<String>,

    #[arg(long, env = "SCAN_TRACKER_BROKER_PASSWORD", hide_env_values = true)]
    pub broker_password: Option<String>,

    /// Topic name or fully qualified destination
    #[arg(long, env = "SCAN_TRACKER_DESTINATION")]
    pub destination: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl HttpConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub broker: BrokerConfig,
    pub http: HttpConfig,
}

impl ServiceConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json5(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json5(raw: &str) -> Result<Self, json5::Error> {
        json5::from_str(raw)
    }

    /// Builds the effective configuration: command line and environment over
    /// the config file over built-in defaults.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        Ok(config)
    }

    fn apply_overrides(&mut self, args: &Args) {
        if let Some(host) = &args.host {
            self.http.host = host.clone();
        }
        if let Some(port) = args.port {
            self.http.port = port;
        }
        if let Some(host) = &args.broker_host {
            self.broker.host = host.clone();
        }
        if let Some(port) = args.broker_port {
            self.broker.port = port;
        }
        if let Some(user) = &args.broker_user {
            self.broker.username = user.clone();
        }
        if let Some(password) = &args.broker_password {
            self.broker.password = password.clone();
        }
        if let Some(destination) = &args.destination {
            self.broker.destination = destination.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Args, ConfigError, ServiceConfig};
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn defaults_match_deployment_values() {
        let config = ServiceConfig::default();

        assert_eq!(config.http.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.broker.address(), "localhost:61613");
        assert_eq!(config.broker.username, "guest");
        assert_eq!(config.broker.destination, "public.worker.event");
        assert_eq!(config.broker.connect_timeout_secs, 5);
    }

    #[test]
    fn json5_file_sections_are_partial() {
        let config = ServiceConfig::from_json5(
            r#"{
                // only what differs from the defaults
                broker: { host: "activemq", destination: "/queue/scans" },
                http: { port: 9000 },
            }"#,
        )
        .expect("valid json5");

        assert_eq!(config.broker.host, "activemq");
        assert_eq!(config.broker.port, 61613);
        assert_eq!(config.broker.destination, "/queue/scans");
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 9000);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ServiceConfig::from_json5(r#"{ broker: { hots: "typo" } }"#).is_err());
        assert!(ServiceConfig::from_json5(r#"{ metrics: {} }"#).is_err());
    }

    #[test]
    fn command_line_overrides_defaults() {
        let args = Args::try_parse_from([
            "scan-tracker-service",
            "--port",
            "8080",
            "--broker-host",
            "broker.local",
            "--destination",
            "scans",
        ])
        .expect("valid arguments");

        let config = ServiceConfig::resolve(&args).expect("no config file needed");

        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.broker.host, "broker.local");
        assert_eq!(config.broker.destination, "scans");
        assert_eq!(config.broker.password, "guest");
    }

    #[test]
    fn missing_config_file_is_reported() {
        let result = ServiceConfig::from_file(Path::new("/nonexistent/scan-tracker.json5"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
