// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix message handler for the message bus client connection.

use crate::bus::{BusMessage, Close, ConnectionEvent, ConnectionState, MessageBusClient};
use crate::cloud::DecoraApi;
use crate::errors::ServiceError;
use crate::intent::{IntentKind, vocab_prefix};
use crate::skill::{Connect, RegisterSkill, Shutdown, Skill};
use actix::{
    ActorFutureExt, AsyncContext, AtomicResponse, Handler, ResponseActFuture, WrapFuture, fut,
};
use futures::StreamExt;
use log::{debug, info, warn};

impl<A: DecoraApi> Handler<Connect> for Skill<A> {
    type Result = ResponseActFuture<Self, Result<(), ServiceError>>;

    fn handle(&mut self, _msg: Connect, ctx: &mut Self::Context) -> Self::Result {
        self.connect = true;
        if self.bus_client.is_some() {
            debug!("Already connected to the message bus");
            return Box::pin(fut::result(Ok(())));
        }

        let ws_request = self
            .ws_client
            .ws(self.bus_settings.url.as_str())
            .max_frame_size(self.bus_settings.max_frame_size_kb * 1024);
        let url = self.bus_settings.url.clone();
        let skill_id = self.skill.id.clone();
        let inbound = ctx.address().recipient();
        let events = ctx.address().recipient();
        let heartbeat = self.bus_settings.heartbeat;
        let msg_tracing = self.msg_tracing;

        Box::pin(
            async move {
                debug!("Connecting to: {url}");

                let (_, framed) = match ws_request.connect().await {
                    Ok((r, f)) => (r, f),
                    Err(e) => {
                        warn!("Could not connect to {url}: {e:?}");
                        return Err(ServiceError::from(e));
                    }
                };
                info!("Connected to: {url} ({heartbeat})");

                let (sink, stream) = framed.split();
                let addr = MessageBusClient::start(
                    &url,
                    &skill_id,
                    inbound,
                    events,
                    sink,
                    stream,
                    heartbeat,
                    msg_tracing,
                );

                Ok(addr)
            }
            .into_actor(self) // converts future to ActorFuture
            .map(move |result, act, ctx| match result {
                Ok(addr) => {
                    act.bus = Some(addr.clone().recipient());
                    act.bus_client = Some(addr);
                    act.reconnect_duration = act.bus_settings.reconnect.duration;
                    act.reconnect_attempt = 0;
                    ctx.notify(RegisterSkill);
                    Ok(())
                }
                Err(e) => {
                    act.schedule_reconnect(ctx);
                    Err(e)
                }
            }),
        )
    }
}

impl<A: DecoraApi> Handler<ConnectionEvent> for Skill<A> {
    type Result = ();

    fn handle(&mut self, msg: ConnectionEvent, ctx: &mut Self::Context) -> Self::Result {
        match msg.state {
            ConnectionState::Connected => {
                info!("Message bus client connected: {}", msg.client_id);
            }
            ConnectionState::Closed => {
                info!("Message bus client disconnected: {}", msg.client_id);
                self.bus = None;
                self.bus_client = None;

                if self.connect {
                    info!("Start reconnecting to message bus: {}", msg.client_id);
                    self.schedule_reconnect(ctx);
                }
            }
        }
    }
}

impl<A: DecoraApi> Handler<RegisterSkill> for Skill<A> {
    type Result = ();

    fn handle(&mut self, _msg: RegisterSkill, _ctx: &mut Self::Context) -> Self::Result {
        let prefix = vocab_prefix(&self.skill.id);
        let mut messages = Vec::new();

        for (name, entries) in self.resources.vocabulary() {
            let entity_type = format!("{prefix}{name}");
            for entry in entries {
                messages.push(BusMessage::register_vocab(
                    &entry.phrase,
                    &entity_type,
                    None,
                ));
                for alias in &entry.aliases {
                    messages.push(BusMessage::register_vocab(
                        alias,
                        &entity_type,
                        Some(&entry.phrase),
                    ));
                }
            }
        }

        for definition in IntentKind::definitions() {
            messages.push(BusMessage::register_intent(
                definition.register_data(&self.skill.id),
            ));
        }

        info!(
            "Registering {} intents of skill {}",
            IntentKind::definitions().len(),
            self.skill.id
        );
        for msg in messages {
            self.send_bus(msg);
        }
    }
}

impl<A: DecoraApi> Handler<Shutdown> for Skill<A> {
    type Result = AtomicResponse<Self, ()>;

    fn handle(&mut self, _msg: Shutdown, _ctx: &mut Self::Context) -> Self::Result {
        self.connect = false;
        self.send_bus(BusMessage::detach_skill(&self.skill.id));
        if let Some(addr) = self.bus_client.as_ref() {
            addr.do_send(Close::default());
        }

        let api = self.api.clone();
        let session = self.session.take();
        AtomicResponse::new(Box::pin(
            async move {
                if let Some(session) = session {
                    if let Err(e) = api.logout(&session).await {
                        warn!("Logout failed: {e}");
                    }
                }
            }
            .into_actor(self),
        ))
    }
}
