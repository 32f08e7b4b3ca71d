// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Decora WiFi cloud service access.
//!
//! The [`DecoraApi`] trait covers the small part of the Leviton cloud API the skill needs:
//! authentication, walking the permission → account → residence → switch hierarchy and updating
//! switch attributes. [`DecoraClient`] is the HTTP implementation.

mod client;
#[cfg(test)]
pub(crate) mod fake;
mod model;

pub use client::DecoraClient;
pub use model::*;

use crate::errors::ServiceError;

/// Decora WiFi cloud operations.
///
/// Implementations are cheap to clone and are used from a single-threaded actor context, so the
/// returned futures don't need to be `Send`.
#[allow(async_fn_in_trait)]
pub trait DecoraApi: Clone + Unpin + 'static {
    /// Authenticate with email and password and return a new session.
    async fn login(&self, email: &str, password: &str) -> Result<Session, ServiceError>;

    /// Invalidate the session's access token.
    async fn logout(&self, session: &Session) -> Result<(), ServiceError>;

    /// Residential permissions of the session user, in service order.
    async fn residential_permissions(
        &self,
        session: &Session,
    ) -> Result<Vec<ResidentialPermission>, ServiceError>;

    /// Residences of a residential account.
    async fn residences(
        &self,
        session: &Session,
        account_id: u64,
    ) -> Result<Vec<Residence>, ServiceError>;

    /// IoT switches of a residence.
    async fn iot_switches(
        &self,
        session: &Session,
        residence_id: u64,
    ) -> Result<Vec<IotSwitch>, ServiceError>;

    /// Apply a partial attribute update to a switch and return the updated switch.
    async fn update_attributes(
        &self,
        session: &Session,
        switch_id: u64,
        attributes: &SwitchAttributes,
    ) -> Result<IotSwitch, ServiceError>;
}
