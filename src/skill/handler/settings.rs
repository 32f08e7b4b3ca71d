// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix message handler for credential changes.

use crate::cloud::{DecoraApi, Session};
use crate::configuration::{Credentials, save_user_settings};
use crate::errors::ServiceError;
use crate::skill::{Login, Skill, SkillModeInput, UpdateCredentials};
use actix::{AsyncContext, Context, Handler, WrapFuture};
use log::{debug, info, warn};

impl<A: DecoraApi> Handler<UpdateCredentials> for Skill<A> {
    type Result = Result<(), ServiceError>;

    fn handle(&mut self, msg: UpdateCredentials, ctx: &mut Self::Context) -> Self::Result {
        self.update_credentials(msg.0, ctx)
    }
}

impl<A: DecoraApi> Skill<A> {
    /// Use new credentials and log in again if they changed.
    pub(super) fn update_credentials(
        &mut self,
        credentials: Credentials,
        ctx: &mut Context<Self>,
    ) -> Result<(), ServiceError> {
        let credentials = Credentials {
            email: credentials.email.trim().to_string(),
            password: credentials.password,
        };
        if credentials.email.is_empty() || credentials.password.is_empty() {
            return Err(ServiceError::BadRequest(
                "Email and password are required".into(),
            ));
        }
        if self.is_ready() && self.credentials.as_ref() == Some(&credentials) {
            debug!("Credentials not changed");
            return Ok(());
        }

        info!("Decora WiFi credentials changed");
        if self.persist_credentials {
            if let Err(e) = save_user_settings(&credentials) {
                warn!("Credentials are only used until restart: {e}");
            }
        }
        self.credentials = Some(credentials);
        self.switch = None;
        if self.is_ready() {
            self.consume(SkillModeInput::CredentialsChanged);
        }
        if let Some(session) = self.session.take() {
            self.logout(session, ctx);
        }

        ctx.address().do_send(Login);
        Ok(())
    }

    /// Log out a session of the previous credentials in the background.
    fn logout(&self, session: Session, ctx: &mut Context<Self>) {
        let api = self.api.clone();
        ctx.spawn(
            async move {
                if let Err(e) = api.logout(&session).await {
                    warn!("Logout of previous session failed: {e}");
                }
            }
            .into_actor(self),
        );
    }
}
