// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix Actor message definitions for MessageBusClient

use crate::bus::BusMessage;
use crate::errors::ServiceError;
use actix::prelude::Message;
use awc::error::WsProtocolError;
use awc::ws::CloseCode;

/// Send a message on the message bus.
#[derive(Debug, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct SendBusMessage(pub BusMessage);

/// Message received from the message bus.
#[derive(Debug, Message)]
#[rtype(result = "()")]
pub struct InboundBusMessage(pub BusMessage);

/// Bus client connection states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Closed,
}

/// Bus client connection events
#[derive(Debug, Message)]
#[rtype(result = "()")]
pub struct ConnectionEvent {
    pub client_id: String,
    pub state: ConnectionState,
}

/// Bus client request: disconnect and close the session.
// Used internally by the client and from the skill
#[derive(Message)]
#[rtype(result = "()")]
pub struct Close {
    /// WebSocket close code
    pub code: CloseCode,
    pub description: Option<String>,
}

impl Default for Close {
    fn default() -> Self {
        Self {
            code: CloseCode::Normal,
            description: None,
        }
    }
}

impl Close {
    /// Close the connection after a WebSocket protocol violation.
    pub fn protocol_error(e: &WsProtocolError) -> Self {
        Self {
            code: CloseCode::Protocol,
            description: Some(e.to_string()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            code: CloseCode::Unsupported,
            description: None,
        }
    }
}
