// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix message handler for incoming message bus messages.

use crate::bus::{BusMessage, InboundBusMessage, MSG_SETTINGS_CHANGED, MSG_STOP};
use crate::cloud::DecoraApi;
use crate::configuration::Credentials;
use crate::errors::ServiceError;
use crate::intent::{IntentMessage, intent_from_msg_type};
use crate::skill::Skill;
use crate::util::DeserializeMsgData;
use actix::{ActorFutureExt, AtomicResponse, Handler, fut};
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Skill settings of the settings service.
#[derive(Deserialize)]
struct SettingsData {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl<A: DecoraApi> Handler<InboundBusMessage> for Skill<A> {
    type Result = AtomicResponse<Self, ()>;

    fn handle(&mut self, msg: InboundBusMessage, ctx: &mut Self::Context) -> Self::Result {
        let msg = msg.0;

        if let Some(kind) = intent_from_msg_type(&self.skill.id, &msg.msg_type) {
            let intent = IntentMessage::from_bus_data(kind, &msg.data, &self.skill.id);
            return AtomicResponse::new(Box::pin(self.execute_intent(intent, msg).map(
                |result, _act, _ctx| {
                    if let Err(e) = result {
                        debug!("Intent failed: {e}");
                    }
                },
            )));
        }

        match msg.msg_type.as_str() {
            MSG_SETTINGS_CHANGED => match self.settings_from_msg(msg) {
                Ok(Some(credentials)) => {
                    if let Err(e) = self.update_credentials(credentials, ctx) {
                        error!("Invalid skill settings: {e}");
                    }
                }
                Ok(None) => {}
                Err(e) => error!("Invalid settings message: {e}"),
            },
            MSG_STOP => info!("Stop request: nothing to stop"),
            _ => {}
        }

        AtomicResponse::new(Box::pin(fut::ready(())))
    }
}

impl<A: DecoraApi> Skill<A> {
    /// Extract the credentials of this skill from a settings changed message.
    fn settings_from_msg(&self, msg: BusMessage) -> Result<Option<Credentials>, ServiceError> {
        let mut all_settings: HashMap<String, Value> = msg.deserialize()?;
        let Some(settings) = all_settings.remove(&self.skill.id) else {
            return Ok(None);
        };
        let settings: SettingsData = serde_json::from_value(settings)?;
        Ok(Some(Credentials {
            email: settings.email,
            password: settings.password,
        }))
    }
}
