// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Skill actor: owns the Decora WiFi session, the cached switch and the message bus connection.
//!
//! All bus messages are handled one at a time. Login and intent handlers keep the actor busy until
//! their cloud requests finish, so the session and switch cache are never used concurrently.

mod handler;
mod messages;

pub use messages::*;

use crate::bus::{BusMessage, MessageBusClient, SendBusMessage};
use crate::cloud::{DecoraApi, IotSwitch, ResidentialPermission, Session};
use crate::configuration::{Credentials, MessageBusSettings, Settings, SkillSettings};
use crate::errors::ServiceError;
use crate::resolver::SelectionPolicy;
use crate::resources::SkillResources;
use crate::util::{MsgTracing, new_websocket_client};
use actix::prelude::{Actor, Context, Recipient};
use actix::{Addr, AsyncContext};
use log::{debug, info, warn};
use rust_fsm::*;
use std::time::Duration;

state_machine! {
    derive(Debug)
    SkillMode(Unauthenticated)

    Unauthenticated(CredentialsAvailable) => LoggingIn,
    LoggingIn => {
        LoginSucceeded => Ready,
        LoginFailed => Unauthenticated,
    },
    Ready => {
        CredentialsChanged => LoggingIn [InvalidateSession],
        SessionExpired => Unauthenticated [InvalidateSession],
    },
}

pub struct Skill<A: DecoraApi> {
    skill: SkillSettings,
    bus_settings: MessageBusSettings,
    api: A,
    resources: SkillResources,
    credentials: Option<Credentials>,
    /// Store changed credentials in the user settings file
    persist_credentials: bool,
    session: Option<Session>,
    /// A login request is running
    logging_in: bool,
    permissions: Vec<ResidentialPermission>,
    policy: SelectionPolicy,
    /// Resolved switch, reused for all commands until invalidated
    switch: Option<IotSwitch>,
    machine: StateMachine<SkillMode>,
    /// WebSocket client
    // creating an expensive client is sufficient once per process and can be used to create multiple connections
    ws_client: awc::Client,
    /// Outgoing message bus messages
    bus: Option<Recipient<SendBusMessage>>,
    bus_client: Option<Addr<MessageBusClient>>,
    /// Message bus connection mode: true = connect (& reconnect), false = disconnect
    connect: bool,
    reconnect_duration: Duration,
    reconnect_attempt: u32,
    msg_tracing: MsgTracing,
}

impl<A: DecoraApi> Skill<A> {
    pub fn new(settings: Settings, api: A, msg_tracing: MsgTracing) -> Result<Self, ServiceError> {
        let Settings {
            skill,
            bus,
            decora,
        } = settings;
        let resources = SkillResources::load(&skill)?;
        let ws_client = new_websocket_client(
            Duration::from_secs(bus.connection_timeout as u64),
            bus.url.scheme() == "wss",
        )?;

        Ok(Self {
            credentials: decora.credentials(),
            policy: decora.selection_policy(),
            reconnect_duration: bus.reconnect.duration,
            skill,
            bus_settings: bus,
            api,
            resources,
            persist_credentials: true,
            session: None,
            logging_in: false,
            permissions: Vec::new(),
            switch: None,
            machine: StateMachine::new(),
            ws_client,
            bus: None,
            bus_client: None,
            connect: false,
            reconnect_attempt: 0,
            msg_tracing,
        })
    }

    /// Publish a message on the bus. Sending is best-effort only!
    ///
    /// Messages are queued regardless of the bus client's mailbox capacity: skill registration
    /// sends all vocabulary and intents at once.
    fn send_bus(&self, msg: BusMessage) {
        match self.bus.as_ref() {
            Some(bus) if bus.connected() => bus.do_send(SendBusMessage(msg)),
            _ => warn!("Message bus not connected, dropping {}", msg.msg_type),
        }
    }

    fn consume(&mut self, input: SkillModeInput) {
        match self.machine.consume(&input) {
            Ok(Some(SkillModeOutput::InvalidateSession)) => {
                debug!("Invalidating Decora WiFi session data");
                self.permissions.clear();
                self.switch = None;
            }
            Ok(None) => {}
            Err(_) => warn!(
                "Ignoring {input:?} in state {:?}",
                self.machine.state()
            ),
        }
    }

    fn is_ready(&self) -> bool {
        matches!(self.machine.state(), &SkillModeState::Ready)
    }

    fn increment_reconnect_timeout(&mut self) {
        let reconnect = &self.bus_settings.reconnect;
        let new_timeout = Duration::from_millis(
            (self.reconnect_duration.as_millis() as f32 * reconnect.backoff_factor) as u64,
        );

        self.reconnect_duration = if new_timeout.gt(&reconnect.duration_max) {
            reconnect.duration_max
        } else {
            new_timeout
        };
        info!(
            "New reconnect timeout: {}",
            self.reconnect_duration.as_millis()
        )
    }

    fn schedule_reconnect(&mut self, ctx: &mut Context<Self>) {
        if !self.connect {
            return;
        }
        self.reconnect_attempt += 1;
        let attempts = self.bus_settings.reconnect.attempts;
        if attempts > 0 && self.reconnect_attempt > attempts {
            info!("Max reconnect attempts reached ({attempts}). Giving up!");
            self.connect = false;
            return;
        }
        ctx.notify_later(Connect, self.reconnect_duration);
        self.increment_reconnect_timeout();
    }
}

impl<A: DecoraApi> Actor for Skill<A> {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("Skill {} started", self.skill.id);
        if self.credentials.is_some() {
            ctx.address().do_send(Login);
        } else {
            warn!("No Decora WiFi credentials configured, waiting for settings");
        }
    }
}
