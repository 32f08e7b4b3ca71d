// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Response notifier: speaks the confirmation of a switch command, or only logs it in silent mode.

use crate::bus::BusMessage;
use crate::dispatcher::Confirmation;
use crate::resources::SkillResources;
use log::info;

/// Create the user feedback for an executed command.
///
/// Returns the `speak` message to publish, or `None` if the confirmation was logged because the
/// user asked for a silent command.
pub fn confirm(
    resources: &mut SkillResources,
    skill_id: &str,
    confirmation: &Confirmation,
    silent: bool,
) -> Option<BusMessage> {
    if silent {
        info!("{}", confirmation.log);
        return None;
    }

    let utterance = resources.render_dialog(confirmation.dialog, &confirmation.data);
    Some(BusMessage::speak(
        utterance,
        skill_id,
        confirmation.dialog,
        &confirmation.data,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MSG_SPEAK;
    use serde_json::{Map, Value, json};

    fn confirmation(dialog: &'static str, data: Value) -> Confirmation {
        Confirmation {
            dialog,
            data: data.as_object().cloned().unwrap_or_else(Map::new),
            log: "Light Set To: 42%".into(),
        }
    }

    #[test]
    fn silent_confirmation_is_not_spoken() {
        let mut resources = SkillResources::embedded();
        let msg = confirm(
            &mut resources,
            "decora-wifi-skill",
            &confirmation("light.set", json!({"result": "42, percent"})),
            true,
        );

        assert_eq!(None, msg);
    }

    #[test]
    fn confirmation_is_spoken_with_dialog_data() {
        let mut resources = SkillResources::embedded();
        let msg = confirm(
            &mut resources,
            "decora-wifi-skill",
            &confirmation("light.set", json!({"result": "42, percent"})),
            false,
        )
        .expect("speak message");

        assert_eq!(MSG_SPEAK, msg.msg_type);
        assert_eq!(
            Some(&json!("The light is set to 42, percent")),
            msg.data.get("utterance")
        );
        assert_eq!(Some(&json!(false)), msg.data.get("expect_response"));
        assert_eq!(
            json!({"skill": "decora-wifi-skill", "dialog": "light.set", "data": {"result": "42, percent"}}),
            msg.data["meta"]
        );
    }
}
