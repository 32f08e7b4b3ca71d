// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Message bus data structure definitions for JSON serialization & deserialization.

use crate::util::DeserializeMsgData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub const MSG_SPEAK: &str = "speak";
pub const MSG_REGISTER_VOCAB: &str = "register_vocab";
pub const MSG_REGISTER_INTENT: &str = "register_intent";
pub const MSG_DETACH_SKILL: &str = "detach_skill";
pub const MSG_SETTINGS_CHANGED: &str = "mycroft.skills.settings.changed";
pub const MSG_STOP: &str = "mycroft.stop";

/// Generic message bus message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl BusMessage {
    pub fn new(msg_type: impl Into<String>, data: Value) -> Self {
        Self {
            msg_type: msg_type.into(),
            data: match data {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            context: None,
        }
    }

    /// Spoken response of the skill.
    pub fn speak(
        utterance: impl Into<String>,
        skill_id: &str,
        dialog: &str,
        dialog_data: &Map<String, Value>,
    ) -> Self {
        Self::new(
            MSG_SPEAK,
            json!({
                "utterance": utterance.into(),
                "expect_response": false,
                "meta": {
                    "skill": skill_id,
                    "dialog": dialog,
                    "data": dialog_data,
                }
            }),
        )
    }

    /// Register a vocabulary phrase for an entity type. Aliases refer to their main phrase.
    pub fn register_vocab(phrase: &str, entity_type: &str, alias_of: Option<&str>) -> Self {
        let mut msg = Self::new(
            MSG_REGISTER_VOCAB,
            json!({ "start": phrase, "end": entity_type }),
        );
        if let Some(alias_of) = alias_of {
            msg.data.insert("alias_of".into(), alias_of.into());
        }
        msg
    }

    pub fn register_intent(intent: Value) -> Self {
        Self::new(MSG_REGISTER_INTENT, intent)
    }

    /// Remove all intents of the skill from the intent service.
    pub fn detach_skill(skill_id: &str) -> Self {
        Self::new(MSG_DETACH_SKILL, json!({ "skill_id": format!("{skill_id}:") }))
    }

    /// Messages the skill handles: its own intents, settings changes and stop requests.
    pub fn is_for_skill(&self, skill_id: &str) -> bool {
        match self.msg_type.as_str() {
            MSG_SETTINGS_CHANGED | MSG_STOP => true,
            msg_type => msg_type
                .strip_prefix(skill_id)
                .is_some_and(|rest| rest.starts_with(':')),
        }
    }

    /// Set the context of a response to the given message: source and destination are swapped.
    pub fn reply_to(mut self, request: &BusMessage) -> Self {
        let Some(Value::Object(mut context)) = request.context.clone() else {
            return self;
        };
        let source = context.remove("source");
        let destination = context.remove("destination");
        if let Some(destination) = destination {
            context.insert("source".into(), destination);
        }
        if let Some(source) = source {
            context.insert("destination".into(), source);
        }
        self.context = Some(Value::Object(context));
        self
    }
}

impl From<BusMessage> for Option<Value> {
    fn from(msg: BusMessage) -> Self {
        Some(Value::Object(msg.data))
    }
}

impl DeserializeMsgData for BusMessage {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn deserialize_message_without_data_and_context() {
        let msg: BusMessage = serde_json::from_str(r#"{"type": "mycroft.stop"}"#).unwrap();

        assert_eq!(MSG_STOP, msg.msg_type);
        assert!(msg.data.is_empty());
        assert_eq!(None, msg.context);
    }

    #[test]
    fn serialize_speak_message() {
        let data = json!({"result": "42, percent"}).as_object().cloned().unwrap();
        let msg = BusMessage::speak("Light set to 42, percent", "decora-wifi-skill", "light.set", &data);

        assert_eq!(
            json!({
                "type": "speak",
                "data": {
                    "utterance": "Light set to 42, percent",
                    "expect_response": false,
                    "meta": {
                        "skill": "decora-wifi-skill",
                        "dialog": "light.set",
                        "data": {"result": "42, percent"}
                    }
                }
            }),
            serde_json::to_value(msg).unwrap()
        );
    }

    #[test]
    fn register_vocab_alias() {
        let msg = BusMessage::register_vocab("decor switch", "decora_wifi_skillDeviceKeyword", Some("decora switch"));

        assert_eq!(
            json!({"start": "decor switch", "end": "decora_wifi_skillDeviceKeyword", "alias_of": "decora switch"}),
            Value::Object(msg.data)
        );
    }

    #[test]
    fn detach_skill_uses_intent_prefix() {
        let msg = BusMessage::detach_skill("decora-wifi-skill");
        assert_eq!(Some(&json!("decora-wifi-skill:")), msg.data.get("skill_id"));
    }

    #[test]
    fn reply_swaps_source_and_destination() {
        let request = BusMessage {
            msg_type: "decora-wifi-skill:DecoraWifiOnIntent".into(),
            context: Some(json!({"source": "audio", "destination": "skills", "session": "abc"})),
            ..Default::default()
        };

        let reply = BusMessage::new(MSG_SPEAK, json!({})).reply_to(&request);

        assert_eq!(
            Some(json!({"source": "skills", "destination": "audio", "session": "abc"})),
            reply.context
        );
    }

    #[rstest]
    #[case("decora-wifi-skill:DecoraWifiOnIntent", true)]
    #[case("mycroft.skills.settings.changed", true)]
    #[case("mycroft.stop", true)]
    #[case("decora-wifi-skill-other:DecoraWifiOnIntent", false)]
    #[case("other-skill:DecoraWifiOnIntent", false)]
    #[case("recognizer_loop:utterance", false)]
    #[case("speak", false)]
    fn skill_message_filter(#[case] msg_type: &str, #[case] expected: bool) {
        let msg = BusMessage::new(msg_type, json!({}));
        assert_eq!(expected, msg.is_for_skill("decora-wifi-skill"));
    }

    #[test]
    fn deserialize_msg_data() {
        #[derive(Deserialize)]
        struct Stop {
            reason: String,
        }
        let msg = BusMessage::new(MSG_STOP, json!({"reason": "user"}));
        let stop: Stop = msg.deserialize().unwrap();
        assert_eq!("user", stop.reason);
    }
}
