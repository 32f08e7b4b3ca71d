// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Message bus WebSocket client implementation with Actix actors.
//!
//! The bus is a broadcast channel: every client receives all messages. The client forwards the
//! messages addressed to the skill to its inbound recipient and reports connection changes to the
//! event recipient.

use std::time::Instant;

use actix::io::SinkWrite;
use actix::{Actor, ActorContext, Addr, AsyncContext, Context, Recipient};
use actix_codec::Framed;
use awc::ws::Codec;
use awc::{BoxedSocket, ws};
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use log::{debug, error, warn};
use url::Url;

use crate::configuration::HeartbeatSettings;
use crate::errors::ServiceError;
use crate::util::MsgTracing;

mod actor;
mod close_handler;
pub mod messages;
mod model;
mod streamhandler;

pub use messages::*;
pub use model::*;

pub struct MessageBusClient {
    /// Unique client id for logging
    id: String,
    /// Only messages of this skill are forwarded
    skill_id: String,
    sink: SinkWrite<ws::Message, SplitSink<Framed<BoxedSocket, Codec>, ws::Message>>,
    /// Receiver of all incoming bus messages
    inbound: Recipient<InboundBusMessage>,
    /// Receiver of connection events
    events: Recipient<ConnectionEvent>,
    /// Last heart beat timestamp.
    last_hb: Instant,
    heartbeat: HeartbeatSettings,
    msg_tracing: MsgTracing,
}

impl MessageBusClient {
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        url: &Url,
        skill_id: &str,
        inbound: Recipient<InboundBusMessage>,
        events: Recipient<ConnectionEvent>,
        sink: SplitSink<Framed<BoxedSocket, Codec>, ws::Message>,
        stream: SplitStream<Framed<BoxedSocket, Codec>>,
        heartbeat: HeartbeatSettings,
        msg_tracing: MsgTracing,
    ) -> Addr<Self> {
        MessageBusClient::create(|ctx| {
            ctx.add_stream(stream);
            let host = url.host_str().unwrap_or(url.as_str());
            let port = url.port_or_known_default().unwrap_or_default();
            MessageBusClient {
                id: format!("{host}:{port}"),
                skill_id: skill_id.to_string(),
                sink: SinkWrite::new(sink, ctx),
                inbound,
                events,
                last_hb: Instant::now(),
                heartbeat,
                msg_tracing,
            }
        })
    }

    fn heartbeat(&self, ctx: &mut Context<Self>) {
        ctx.run_later(self.heartbeat.interval, |act, ctx| {
            // check server heartbeats
            if Instant::now().duration_since(act.last_hb) > act.heartbeat.timeout {
                error!(
                    "[{}] Message bus heartbeat failed, disconnecting!",
                    act.id
                );

                // Stop sending pings & Stop actor
                ctx.stop();
                return;
            }

            if act
                .send_message(ws::Message::Ping(Bytes::new()), "Ping", ctx)
                .is_ok()
            {
                act.heartbeat(ctx);
            }
        });
    }

    fn on_text_message(&mut self, txt: Bytes, _ctx: &mut Context<MessageBusClient>) {
        let msg = match parse_bus_message(&self.id, txt.as_ref()) {
            Ok(m) => m,
            // other bus clients may send anything, the connection stays open
            Err(_) => return,
        };

        if self.msg_tracing.incoming {
            debug!("[{}] -> {msg:?}", self.id);
        }

        forward_to_skill(&self.inbound, &self.skill_id, msg);
    }

    fn on_binary_message(&mut self, _: Bytes, ctx: &mut Context<MessageBusClient>) {
        error!("[{}] Binary messages not supported! Disconnecting", self.id);
        ctx.notify(Close::unsupported());
    }

    fn on_ping_message(&mut self, bytes: Bytes, ctx: &mut Context<MessageBusClient>) {
        debug!("[{}] -> Ping", self.id);
        self.last_hb = Instant::now();
        let _ = self.send_message(ws::Message::Pong(bytes), "Pong", ctx);
    }

    fn on_pong_message(&mut self, _: Bytes, _: &mut Context<MessageBusClient>) {
        debug!("[{}] -> Pong", self.id);
        self.last_hb = Instant::now();
    }

    fn send_bus_message(
        &mut self,
        msg: &BusMessage,
        ctx: &mut Context<MessageBusClient>,
    ) -> Result<(), ServiceError> {
        let text = serde_json::to_string(msg)?;
        if self.msg_tracing.outgoing {
            debug!("[{}] <- {text}", self.id);
        } else {
            debug!("[{}] <- {}", self.id, msg.msg_type);
        }
        if self.sink.write(ws::Message::Text(text.into())).is_err() {
            // sink is closed or closing, no chance to send a Close message
            warn!(
                "[{}] Could not send {}, closing connection",
                self.id, msg.msg_type
            );
            ctx.stop();
            return Err(ServiceError::NotConnected);
        }
        Ok(())
    }

    fn send_message(
        &mut self,
        msg: ws::Message,
        name: &str,
        ctx: &mut Context<MessageBusClient>,
    ) -> Result<(), ServiceError> {
        debug!("[{}] <- {}", self.id, name);
        if self.sink.write(msg).is_err() {
            // sink is closed or closing, no chance to send a Close message
            warn!("[{}] Could not send {}, closing connection", self.id, name);
            ctx.stop();
            return Err(ServiceError::NotConnected);
        }
        Ok(())
    }
}

/// Forward a received message to the skill if it handles it. Returns `false` if the message was
/// filtered out.
///
/// Delivery doesn't depend on the mailbox capacity: the skill doesn't process its mailbox while a
/// cloud request is running.
pub(crate) fn forward_to_skill(
    inbound: &Recipient<InboundBusMessage>,
    skill_id: &str,
    msg: BusMessage,
) -> bool {
    if !msg.is_for_skill(skill_id) {
        return false;
    }
    inbound.do_send(InboundBusMessage(msg));
    true
}

/// Parse a WebSocket text message into a bus message.
pub fn parse_bus_message(id: &str, txt: &[u8]) -> Result<BusMessage, serde_json::Error> {
    serde_json::from_slice(txt).inspect_err(|e| {
        warn!("[{id}] Invalid bus message: {e}");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::{Handler, Message, MessageResult};
    use serde_json::json;

    #[derive(Default)]
    struct InboundCounter {
        received: Vec<String>,
    }

    impl Actor for InboundCounter {
        type Context = Context<Self>;
    }

    impl Handler<InboundBusMessage> for InboundCounter {
        type Result = ();

        fn handle(&mut self, msg: InboundBusMessage, _ctx: &mut Self::Context) {
            self.received.push(msg.0.msg_type);
        }
    }

    #[derive(Message)]
    #[rtype(result = "Vec<String>")]
    struct Received;

    impl Handler<Received> for InboundCounter {
        type Result = MessageResult<Received>;

        fn handle(&mut self, _msg: Received, _ctx: &mut Self::Context) -> Self::Result {
            MessageResult(self.received.clone())
        }
    }

    #[actix_web::test]
    async fn forward_only_skill_messages_beyond_mailbox_capacity() {
        let counter = InboundCounter::default().start();
        let inbound = counter.clone().recipient();

        // no yield point: the receiving actor can't process anything in between
        let mut forwarded = 0;
        for i in 0..30 {
            let chatter = BusMessage::new("recognizer_loop:utterance", json!({"n": i}));
            assert!(!forward_to_skill(&inbound, "decora-wifi-skill", chatter));
            let own = BusMessage::new("decora-wifi-skill:DecoraWifiOffIntent", json!({"n": i}));
            if forward_to_skill(&inbound, "decora-wifi-skill", own) {
                forwarded += 1;
            }
        }
        assert!(forward_to_skill(
            &inbound,
            "decora-wifi-skill",
            BusMessage::new(MSG_SETTINGS_CHANGED, json!({}))
        ));

        let received = counter.send(Received).await.unwrap();
        assert_eq!(30, forwarded);
        assert_eq!(31, received.len());
        assert_eq!(Some(&MSG_SETTINGS_CHANGED.to_string()), received.last());
    }

    #[test]
    fn parse_intent_message() {
        let msg = parse_bus_message(
            "test",
            br#"{"type": "decora-wifi-skill:DecoraWifiOnIntent", "data": {"utterance": "turn on decora"}, "context": {}}"#,
        )
        .unwrap();

        assert_eq!("decora-wifi-skill:DecoraWifiOnIntent", msg.msg_type);
        assert_eq!(
            Some("turn on decora"),
            msg.data.get("utterance").and_then(|v| v.as_str())
        );
    }

    #[test]
    fn parse_invalid_messages() {
        assert!(parse_bus_message("test", b"not json").is_err());
        assert!(parse_bus_message("test", b"[1, 2]").is_err());
        assert!(parse_bus_message("test", br#"{"data": {}}"#).is_err());
    }
}
