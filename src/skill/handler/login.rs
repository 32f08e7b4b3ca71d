// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix message handler for the Decora WiFi login.

use crate::cloud::DecoraApi;
use crate::errors::ServiceError;
use crate::skill::{Login, Skill, SkillModeInput, SkillModeState};
use crate::util::{return_atomic_err, return_atomic_ok};
use actix::{ActorFutureExt, AtomicResponse, Handler, WrapFuture};
use log::{debug, error, info, warn};

impl<A: DecoraApi> Handler<Login> for Skill<A> {
    type Result = AtomicResponse<Self, Result<(), ServiceError>>;

    fn handle(&mut self, _msg: Login, _ctx: &mut Self::Context) -> Self::Result {
        let Some(credentials) = self.credentials.clone() else {
            warn!("Cannot log in: Decora WiFi credentials missing");
            return_atomic_err!(ServiceError::NotAuthenticated);
        };
        if self.is_ready() {
            return_atomic_ok!(());
        }
        if self.logging_in {
            debug!("Login already in progress");
            return_atomic_ok!(());
        }
        if matches!(self.machine.state(), &SkillModeState::Unauthenticated) {
            self.consume(SkillModeInput::CredentialsAvailable);
        }

        self.logging_in = true;
        let api = self.api.clone();

        AtomicResponse::new(Box::pin(
            async move {
                info!("Logging in to Decora WiFi as {}", credentials.email);
                let session = api.login(&credentials.email, &credentials.password).await?;
                let permissions = api.residential_permissions(&session).await?;
                Ok::<_, ServiceError>((session, permissions))
            }
            .into_actor(self)
            .map(|result, act, _ctx| {
                act.logging_in = false;
                match result {
                    Ok((session, permissions)) => {
                        info!(
                            "Logged in to Decora WiFi, found {} residential permission(s)",
                            permissions.len()
                        );
                        act.session = Some(session);
                        act.permissions = permissions;
                        act.switch = None;
                        act.consume(SkillModeInput::LoginSucceeded);
                        Ok(())
                    }
                    Err(e) => {
                        error!("Decora WiFi login failed: {e}");
                        act.session = None;
                        act.permissions.clear();
                        act.consume(SkillModeInput::LoginFailed);
                        Err(e)
                    }
                }
            }),
        ))
    }
}
