// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Custom application error with conversions from common Rust and 3rd-party errors.

use actix::MailboxError;
use actix::dev::SendError;
use awc::error::{JsonPayloadError, PayloadError, SendRequestError, WsClientError};
use derive_more::Display;
use log::error;

#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display("Internal server error: {_0}")]
    InternalServerError(String),

    #[display("Internal serialization error: {_0}")]
    SerializationError(String),

    #[display("BadRequest: {_0}")]
    BadRequest(String),

    #[display("Not found: {_0}")]
    NotFound(String),

    /// No cloud session available: credentials missing or login failed.
    #[display("Not authenticated with the Decora WiFi service")]
    NotAuthenticated,

    #[display("Authentication failed: {_0}")]
    AuthenticationFailed(String),

    #[display("The connection is closed or closing")]
    NotConnected,

    #[display("Service unavailable: {_0}")]
    ServiceUnavailable(String),
}

impl std::error::Error for ServiceError {}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::InternalServerError(format!("{e:?}"))
    }
}

impl From<MailboxError> for ServiceError {
    fn from(e: MailboxError) -> Self {
        ServiceError::InternalServerError(format!("Internal message error: {e:?}"))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        error!("{e:?}");
        ServiceError::SerializationError(e.to_string())
    }
}

impl From<strum::ParseError> for ServiceError {
    fn from(e: strum::ParseError) -> Self {
        ServiceError::SerializationError(e.to_string())
    }
}

impl From<config::ConfigError> for ServiceError {
    fn from(e: config::ConfigError) -> Self {
        ServiceError::InternalServerError(format!("Configuration error: {e}"))
    }
}

impl From<SendRequestError> for ServiceError {
    fn from(e: SendRequestError) -> Self {
        ServiceError::ServiceUnavailable(format!("Request failed: {e}"))
    }
}

impl From<JsonPayloadError> for ServiceError {
    fn from(e: JsonPayloadError) -> Self {
        ServiceError::SerializationError(format!("Invalid response payload: {e}"))
    }
}

impl From<PayloadError> for ServiceError {
    fn from(e: PayloadError) -> Self {
        ServiceError::ServiceUnavailable(format!("Error reading response: {e}"))
    }
}

impl From<WsClientError> for ServiceError {
    fn from(e: WsClientError) -> Self {
        ServiceError::ServiceUnavailable(format!("WebSocket connection failed: {e}"))
    }
}

impl<T> From<SendError<T>> for ServiceError {
    fn from(e: SendError<T>) -> Self {
        ServiceError::InternalServerError(format!("Error sending internal message: {e:?}"))
    }
}
