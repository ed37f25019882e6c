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

//! Stable event names attached to `tracing` records as the `event` field.
//!
//! Log scrapers key on these values, so renaming one is a breaking change.

pub mod events {
    pub const SESSION_CONNECTED: &str = "session_connected";
    pub const SESSION_CONNECT_FAILED: &str = "session_connect_failed";
    pub const SESSION_SUBSCRIBED: &str = "session_subscribed";
    pub const SESSION_ERROR_FRAME: &str = "session_error_frame";
    pub const SESSION_UNROUTED_MESSAGE: &str = "session_unrouted_message";
    pub const SESSION_READ_FAILED: &str = "session_read_failed";
    pub const SESSION_CLOSED: &str = "session_closed";
    pub const SESSION_DISCONNECTED: &str = "session_disconnected";
    pub const SESSION_DISCONNECT_FAILED: &str = "session_disconnect_failed";

    pub const INGRESS_RECEIVE: &str = "ingress_receive";
    pub const INGRESS_DROP_MALFORMED: &str = "ingress_drop_malformed";
    pub const INGRESS_DROP_INCOMPLETE_START: &str = "ingress_drop_incomplete_start";
    pub const INGRESS_DROP_UNRELATED_STOP: &str = "ingress_drop_unrelated_stop";
    pub const INGRESS_IGNORE_KIND: &str = "ingress_ignore_kind";
    pub const SCAN_STARTED: &str = "scan_started";
    pub const SCAN_STOPPED: &str = "scan_stopped";

    pub const BRIDGE_SCHEDULE_FAILED: &str = "bridge_schedule_failed";

    pub const SUBSCRIBER_ATTACH: &str = "subscriber_attach";
    pub const SUBSCRIBER_DETACH: &str = "subscriber_detach";
    pub const BROADCAST_DELIVER_FAILED: &str = "broadcast_deliver_failed";
    pub const BROADCAST_DONE: &str = "broadcast_done";
    pub const DISPATCHER_STOPPED: &str = "dispatcher_stopped";

    pub const TRACKER_CONNECTED: &str = "tracker_connected";
    pub const TRACKER_DISCONNECTED: &str = "tracker_disconnected";
}
