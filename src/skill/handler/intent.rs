// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix message handler for matched intents.

use crate::bus::BusMessage;
use crate::cloud::DecoraApi;
use crate::dispatcher::command_for;
use crate::errors::ServiceError;
use crate::intent::IntentMessage;
use crate::notifier;
use crate::resolver::resolve_switch;
use crate::skill::{HandleIntent, Skill, SkillModeInput};
use actix::{ActorFutureExt, AtomicResponse, Handler, ResponseActFuture, WrapFuture, fut};
use log::{debug, error, info, warn};

impl<A: DecoraApi> Handler<HandleIntent> for Skill<A> {
    type Result = AtomicResponse<Self, Result<(), ServiceError>>;

    fn handle(&mut self, msg: HandleIntent, _ctx: &mut Self::Context) -> Self::Result {
        AtomicResponse::new(self.execute_intent(msg.intent, msg.request))
    }
}

impl<A: DecoraApi> Skill<A> {
    /// Derive the switch command of the intent, apply it and confirm it to the user.
    pub(super) fn execute_intent(
        &mut self,
        intent: IntentMessage,
        request: BusMessage,
    ) -> ResponseActFuture<Self, Result<(), ServiceError>> {
        info!("Handling {}", intent.kind);
        let Some(command) = command_for(&intent) else {
            return Box::pin(fut::result(Ok(())));
        };
        let Some(session) = self.session.clone() else {
            error!("Cannot handle {}: not logged in to Decora WiFi", intent.kind);
            return Box::pin(fut::result(Err(ServiceError::NotAuthenticated)));
        };

        let api = self.api.clone();
        let permissions = self.permissions.clone();
        let cached = self.switch.clone();
        let policy = self.policy.clone();
        let attributes = command.attributes.clone();

        Box::pin(
            async move {
                let switch = match cached {
                    Some(switch) => switch,
                    None => resolve_switch(&api, &session, &permissions, &policy).await?,
                };
                debug!("Updating switch {}: {attributes:?}", switch.id);
                api.update_attributes(&session, switch.id, &attributes).await
            }
            .into_actor(self)
            .map(move |result, act, _ctx| match result {
                Ok(switch) => {
                    debug!("Switch state: {:?} {:?}", switch.power, switch.brightness);
                    act.switch = Some(switch);
                    if let Some(speak) = notifier::confirm(
                        &mut act.resources,
                        &act.skill.id,
                        &command.confirmation,
                        intent.is_silent(),
                    ) {
                        act.send_bus(speak.reply_to(&request));
                    }
                    Ok(())
                }
                Err(e) => {
                    act.command_failed(&e);
                    Err(e)
                }
            }),
        )
    }

    fn command_failed(&mut self, e: &ServiceError) {
        match e {
            ServiceError::AuthenticationFailed(_) => {
                warn!("Decora WiFi session expired");
                self.session = None;
                self.consume(SkillModeInput::SessionExpired);
            }
            ServiceError::NotFound(_) => {
                self.switch = None;
            }
            _ => {}
        }
        error!("Switch command failed: {e}");
    }
}
