// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix `Actor` trait implementation.

use actix::{Actor, Context};
use log::debug;

use crate::bus::MessageBusClient;
use crate::bus::messages::{ConnectionEvent, ConnectionState};

impl Actor for MessageBusClient {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Context<Self>) {
        debug!("[{}] Bus client started", self.id);
        self.heartbeat(ctx);
        self.events.do_send(ConnectionEvent {
            client_id: self.id.clone(),
            state: ConnectionState::Connected,
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        debug!("[{}] Bus client stopped", self.id);
        self.events.do_send(ConnectionEvent {
            client_id: self.id.clone(),
            state: ConnectionState::Closed,
        });
    }
}
