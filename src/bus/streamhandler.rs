// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! StreamHandler trait implementation to receive WebSocket frames.

use actix::{ActorContext, AsyncContext, Context, Handler, StreamHandler};
use awc::error::WsProtocolError;
use awc::ws::Frame;
use log::{debug, error, info};

use crate::bus::MessageBusClient;
use crate::bus::messages::{Close, SendBusMessage};
use crate::errors::ServiceError;

impl StreamHandler<Result<Frame, WsProtocolError>> for MessageBusClient {
    fn handle(&mut self, msg: Result<Frame, WsProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Err(e) => {
                error!("[{}] Protocol error: {e}", self.id);
                ctx.notify(Close::protocol_error(&e));
                return;
            }
            Ok(msg) => msg,
        };

        match msg {
            Frame::Text(txt) => self.on_text_message(txt, ctx),
            Frame::Binary(bytes) => self.on_binary_message(bytes, ctx),
            Frame::Ping(b) => self.on_ping_message(b, ctx),
            Frame::Pong(b) => self.on_pong_message(b, ctx),
            Frame::Close(c) => {
                info!("[{}] Message bus closed connection. Reason: {c:?}", self.id);
                self.sink.close();
                ctx.stop();
            }
            Frame::Continuation(_) => {
                error!(
                    "[{}] Continuation frames not supported! Disconnecting",
                    self.id
                );
                ctx.notify(Close::unsupported());
            }
        }
    }

    fn started(&mut self, _: &mut Context<Self>) {
        debug!("[{}] Bus StreamHandler connected", self.id);
    }

    fn finished(&mut self, ctx: &mut Context<Self>) {
        debug!("[{}] Bus StreamHandler disconnected", self.id);
        ctx.stop()
    }
}

impl actix::io::WriteHandler<WsProtocolError> for MessageBusClient {}

impl Handler<SendBusMessage> for MessageBusClient {
    type Result = Result<(), ServiceError>;

    fn handle(&mut self, msg: SendBusMessage, ctx: &mut Self::Context) -> Self::Result {
        self.send_bus_message(&msg.0, ctx)
    }
}
