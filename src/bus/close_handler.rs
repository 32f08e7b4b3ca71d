// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix actor handler implementation for the `Close` message

use crate::bus::MessageBusClient;
use crate::bus::messages::Close;

use actix::{ActorContext, AsyncContext, Handler};
use awc::ws;
use awc::ws::CloseReason;
use log::info;
use std::time::Duration;

impl Handler<Close> for MessageBusClient {
    type Result = ();

    fn handle(&mut self, msg: Close, ctx: &mut Self::Context) -> Self::Result {
        info!("[{}] Close msg: sending Close to message bus", self.id);
        // The server answers with a Close frame which stops the context.
        if self
            .send_message(
                ws::Message::Close(Some(CloseReason {
                    code: msg.code,
                    description: msg.description,
                })),
                "Close",
                ctx,
            )
            .is_ok()
        {
            // hard disconnect if the connection is stale
            ctx.run_later(Duration::from_millis(100), move |act, ctx| {
                info!("[{}] Force stopping actor", act.id);
                act.sink.close();
                ctx.stop();
            });
        }
    }
}
