// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Intent definitions of the skill and decoding of matched intent messages.
//!
//! Vocabulary entity types are namespaced with the alphanumeric form of the skill id, intent
//! names with `<skill_id>:`. See [`IntentDefinition::register_data`].

mod parse;

pub use parse::{delay_seconds, first_integer, normalize, remove_phrases};

use derive_builder::Builder;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, VariantNames};

pub const DEVICE_KEYWORD: &str = "DeviceKeyword";
pub const LIGHT_KEYWORD: &str = "LightKeyword";
pub const SILENT_KEYWORD: &str = "SilentKeyword";

/// Intents handled by the skill.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString, VariantNames,
)]
pub enum IntentKind {
    #[strum(serialize = "DecoraWifiOnIntent")]
    On,
    #[strum(serialize = "DecoraWifiOffIntent")]
    Off,
    #[strum(serialize = "DecoraWifiDimIntent")]
    Dim,
    #[strum(serialize = "DecoraWifiSetIntent")]
    Set,
}

impl IntentKind {
    /// Keyword distinguishing the intent in addition to [`DEVICE_KEYWORD`].
    pub fn keyword(&self) -> &'static str {
        match self {
            IntentKind::On => "OnKeyword",
            IntentKind::Off => "OffKeyword",
            IntentKind::Dim => "DimKeyword",
            IntentKind::Set => "SetKeyword",
        }
    }

    pub fn definition(&self) -> IntentDefinition {
        let mut builder = IntentDefinitionBuilder::default();
        builder.name(self.to_string());
        match self {
            IntentKind::On | IntentKind::Off => {
                builder.require(DEVICE_KEYWORD).require(self.keyword());
            }
            IntentKind::Dim | IntentKind::Set => {
                builder.require(self.keyword()).require(DEVICE_KEYWORD);
            }
        }
        builder
            .optionally(LIGHT_KEYWORD)
            .optionally(SILENT_KEYWORD)
            .build()
            .expect("intent name and required keywords are set")
    }

    /// All intent definitions of the skill.
    pub fn definitions() -> Vec<IntentDefinition> {
        IntentKind::iter().map(|k| k.definition()).collect()
    }

    /// All vocabulary names used by the skill's intents, without duplicates.
    pub fn vocabulary_names() -> Vec<&'static str> {
        let mut names = vec![DEVICE_KEYWORD, LIGHT_KEYWORD, SILENT_KEYWORD];
        names.extend(IntentKind::iter().map(|k| k.keyword()));
        names
    }
}

/// Intent definition for the host's keyword intent parser.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(setter(into))]
pub struct IntentDefinition {
    pub name: String,
    /// Required vocabulary names
    #[builder(setter(each(name = "require", into)))]
    pub requires: Vec<String>,
    /// Optional vocabulary names
    #[builder(default, setter(each(name = "optionally", into)))]
    pub optional: Vec<String>,
}

impl IntentDefinition {
    /// Data payload of a `register_intent` bus message.
    pub fn register_data(&self, skill_id: &str) -> Value {
        let prefix = vocab_prefix(skill_id);
        let keywords = |names: &[String]| -> Vec<Value> {
            names
                .iter()
                .map(|n| {
                    let entity = format!("{prefix}{n}");
                    json!([entity, entity])
                })
                .collect()
        };

        json!({
            "name": qualified_intent_name(skill_id, &self.name),
            "requires": keywords(&self.requires),
            "at_least_one": [],
            "optional": keywords(&self.optional),
        })
    }
}

/// Alphanumeric form of the skill id, used as vocabulary entity type prefix.
pub fn vocab_prefix(skill_id: &str) -> String {
    skill_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Bus message type of a matched intent: `<skill_id>:<intent_name>`.
pub fn qualified_intent_name(skill_id: &str, intent_name: &str) -> String {
    format!("{skill_id}:{intent_name}")
}

/// A matched intent of the skill.
#[derive(Clone, Debug, PartialEq)]
pub struct IntentMessage {
    pub kind: IntentKind,
    pub utterance: String,
    /// Matched keywords with the vocabulary name (without skill prefix) as key.
    pub keywords: HashMap<String, String>,
    /// Matched vocabulary phrases of the utterance.
    pub tags: Vec<String>,
}

impl IntentMessage {
    /// Decode the data payload of a matched intent bus message.
    ///
    /// Keyword keys are expected with the skill's vocabulary prefix, un-prefixed keys are accepted
    /// as well.
    pub fn from_bus_data(kind: IntentKind, data: &Map<String, Value>, skill_id: &str) -> Self {
        let prefix = vocab_prefix(skill_id);
        let vocab_names = IntentKind::vocabulary_names();

        let keywords = data
            .iter()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix(prefix.as_str()).unwrap_or(key);
                if !vocab_names.iter().any(|v| *v == name) {
                    return None;
                }
                value.as_str().map(|v| (name.to_string(), v.to_string()))
            })
            .collect();

        let tags = data
            .get("__tags__")
            .and_then(|v| v.as_array())
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.get("key").and_then(|k| k.as_str()))
                    .map(|k| k.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            kind,
            utterance: data
                .get("utterance")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            keywords,
            tags,
        }
    }

    /// True if the silent keyword was part of the utterance.
    pub fn is_silent(&self) -> bool {
        self.keywords.contains_key(SILENT_KEYWORD)
    }

    /// The normalized utterance without the matched vocabulary phrases.
    pub fn utterance_remainder(&self) -> String {
        remove_phrases(&self.utterance, self.tags.iter().map(|t| t.as_str()))
    }
}

/// Parse a bus message type into the intent of this skill, if it is one.
pub fn intent_from_msg_type(skill_id: &str, msg_type: &str) -> Option<IntentKind> {
    let name = msg_type.strip_prefix(skill_id)?.strip_prefix(':')?;
    name.parse().ok()
}
