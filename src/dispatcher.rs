// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Command dispatcher: translates a matched intent into a partial switch attribute update and the
//! confirmation reported to the user.

use crate::cloud::{Power, SwitchAttributes};
use crate::intent::{IntentKind, IntentMessage, delay_seconds, first_integer};
use log::{debug, info};
use serde_json::{Map, Value};

/// Brightness of the `on` command.
pub const FULL_BRIGHTNESS: u8 = 100;
/// Brightness of the `dim` command.
pub const DIM_BRIGHTNESS: u8 = 5;

/// Switch update derived from an intent.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCommand {
    pub attributes: SwitchAttributes,
    pub confirmation: Confirmation,
    /// Requested delay in seconds. Informational only, the update is always applied immediately.
    pub delay: Option<u64>,
}

/// User feedback after a successful switch update.
#[derive(Clone, Debug, PartialEq)]
pub struct Confirmation {
    /// Dialog name to speak
    pub dialog: &'static str,
    /// Template data for the dialog
    pub data: Map<String, Value>,
    /// Log message used instead of speaking in silent mode
    pub log: String,
}

impl Confirmation {
    fn new(dialog: &'static str, log: impl Into<String>) -> Self {
        Self {
            dialog,
            data: Map::new(),
            log: log.into(),
        }
    }
}

/// Map a matched intent to a switch command.
///
/// Returns `None` if the intent doesn't result in a switch update: a `set` intent without a
/// number in the utterance.
pub fn command_for(intent: &IntentMessage) -> Option<SwitchCommand> {
    let remainder = intent.utterance_remainder();
    debug!("{} remainder: '{remainder}'", intent.kind);

    let command = match intent.kind {
        IntentKind::On => SwitchCommand {
            attributes: SwitchAttributes::power(Power::On).with_brightness(FULL_BRIGHTNESS),
            confirmation: Confirmation::new("light.on", "Light Turned On"),
            delay: requested_delay(&remainder),
        },
        IntentKind::Off => SwitchCommand {
            attributes: SwitchAttributes::power(Power::Off),
            confirmation: Confirmation::new("light.off", "Light Turned Off"),
            delay: requested_delay(&remainder),
        },
        IntentKind::Dim => SwitchCommand {
            attributes: SwitchAttributes::brightness(DIM_BRIGHTNESS),
            confirmation: Confirmation::new("light.dim", "Light Dimmed"),
            delay: None,
        },
        IntentKind::Set => {
            let Some(value) = first_integer(&remainder) else {
                info!("No brightness value in '{}', ignoring", intent.utterance);
                return None;
            };
            let brightness = value.min(FULL_BRIGHTNESS as u64) as u8;
            let mut confirmation =
                Confirmation::new("light.set", format!("Light Set To: {brightness}%"));
            confirmation
                .data
                .insert("result".into(), format!("{brightness}, percent").into());
            SwitchCommand {
                attributes: SwitchAttributes::brightness(brightness),
                confirmation,
                delay: None,
            }
        }
    };

    Some(command)
}

fn requested_delay(remainder: &str) -> Option<u64> {
    let delay = delay_seconds(remainder);
    if let Some(seconds) = delay {
        // not supported by the cloud API, the command is executed right away
        info!("Requested delay: {seconds}s");
    }
    delay
}
