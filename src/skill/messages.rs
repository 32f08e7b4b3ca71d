// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix actor message definitions used to communicate with the [`Skill`].

#[allow(unused_imports)] // used for doc links
use crate::skill::Skill;
use crate::bus::BusMessage;
use crate::configuration::Credentials;
use crate::errors::ServiceError;
use crate::intent::IntentMessage;
use actix::prelude::Message;

/// Connect to the message bus. The connection is re-established until [`Shutdown`] is received.
#[derive(Debug, Default, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct Connect;

/// Detach the skill from the message bus, close the connection and log out.
#[derive(Debug, Default, Message)]
#[rtype(result = "()")]
pub struct Shutdown;

/// Log in to the Decora WiFi service with the current credentials.
///
/// No-op if already logged in.
#[derive(Debug, Default, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct Login;

/// Register the vocabulary and intents of the skill on the message bus.
#[derive(Debug, Default, Message)]
#[rtype(result = "()")]
pub struct RegisterSkill;

/// Execute a matched intent.
///
/// A successful command is confirmed with a `speak` message in response to `request`.
#[derive(Debug, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct HandleIntent {
    pub intent: IntentMessage,
    /// Original bus message of the intent
    pub request: BusMessage,
}

/// Changed Decora WiFi credentials. Triggers a new login.
#[derive(Debug, Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct UpdateCredentials(pub Credentials);
