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

//! STOMP 1.2 client session over TCP.
//!
//! Only the subset needed to consume a topic is spoken: CONNECT, SUBSCRIBE with
//! automatic acknowledgement and DISCONNECT with a receipt. Heart-beating is
//! negotiated off.

pub mod codec;
pub mod frame;
pub mod session;

pub use codec::StompCodec;
pub use frame::{Command, Frame};
pub use session::{StompOptions, StompSession};
