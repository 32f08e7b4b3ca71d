// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Decora WiFi cloud API data structure definitions for JSON serialization & deserialization.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use strum::{AsRefStr, Display, EnumString};

/// Client identifier expected by the login endpoint.
pub const CLIENT_ID: &str = "levdb-echo-proto";
pub const REGISTERED_VIA: &str = "myLeviton";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub client_id: &'a str,
    pub registered_via: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    /// Access token
    pub id: String,
    pub user_id: u64,
}

/// Authenticated Decora WiFi cloud session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub(crate) token: String,
    pub user_id: u64,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: u64) -> Self {
        Self {
            token: token.into(),
            user_id,
        }
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // never expose the access token
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Access permission of the authenticated user.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentialPermission {
    pub id: u64,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub residential_account_id: Option<u64>,
    #[serde(default)]
    pub residence_id: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Residence {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Power {
    On,
    Off,
}

/// Decora WiFi switch or dimmer.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct IotSwitch {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub power: Option<Power>,
    #[serde(default)]
    pub brightness: Option<u8>,
}

/// Partial switch attribute update. Only set fields are sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SwitchAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<Power>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
}

impl SwitchAttributes {
    pub fn power(power: Power) -> Self {
        Self {
            power: Some(power),
            brightness: None,
        }
    }

    pub fn brightness(brightness: u8) -> Self {
        Self {
            power: None,
            brightness: Some(brightness),
        }
    }

    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }
}
