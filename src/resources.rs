// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Skill resources: vocabulary and dialog files.
//!
//! The English resources are compiled in. A resource directory can override single files:
//! `<dir>/vocab/<lang>/<Name>.voc` and `<dir>/dialog/<lang>/<name>.dialog`.

use crate::configuration::SkillSettings;
use crate::errors::ServiceError;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

pub const DEF_LANG: &str = "en-us";

const VOCAB_EXT: &str = "voc";
const DIALOG_EXT: &str = "dialog";

const DEFAULT_VOCAB: [(&str, &str); 7] = [
    (
        "DeviceKeyword",
        include_str!("../resources/vocab/en-us/DeviceKeyword.voc"),
    ),
    (
        "LightKeyword",
        include_str!("../resources/vocab/en-us/LightKeyword.voc"),
    ),
    (
        "OnKeyword",
        include_str!("../resources/vocab/en-us/OnKeyword.voc"),
    ),
    (
        "OffKeyword",
        include_str!("../resources/vocab/en-us/OffKeyword.voc"),
    ),
    (
        "DimKeyword",
        include_str!("../resources/vocab/en-us/DimKeyword.voc"),
    ),
    (
        "SetKeyword",
        include_str!("../resources/vocab/en-us/SetKeyword.voc"),
    ),
    (
        "SilentKeyword",
        include_str!("../resources/vocab/en-us/SilentKeyword.voc"),
    ),
];

const DEFAULT_DIALOGS: [(&str, &str); 4] = [
    (
        "light.on",
        include_str!("../resources/dialog/en-us/light.on.dialog"),
    ),
    (
        "light.off",
        include_str!("../resources/dialog/en-us/light.off.dialog"),
    ),
    (
        "light.dim",
        include_str!("../resources/dialog/en-us/light.dim.dialog"),
    ),
    (
        "light.set",
        include_str!("../resources/dialog/en-us/light.set.dialog"),
    ),
];

/// A vocabulary phrase with its alternative spellings.
#[derive(Clone, Debug, PartialEq)]
pub struct VocabEntry {
    pub phrase: String,
    pub aliases: Vec<String>,
}

/// Vocabulary and dialogs of the skill.
#[derive(Debug, Default)]
pub struct SkillResources {
    /// Vocabulary entries by vocabulary name
    vocabulary: BTreeMap<String, Vec<VocabEntry>>,
    /// Dialog templates by dialog name
    dialogs: HashMap<String, Vec<String>>,
    /// Next template line per dialog
    next_line: HashMap<String, usize>,
}

impl SkillResources {
    /// The compiled-in resources.
    pub fn embedded() -> Self {
        let mut resources = Self::default();
        for (name, content) in DEFAULT_VOCAB {
            resources
                .vocabulary
                .insert(name.to_string(), parse_vocab(content));
        }
        for (name, content) in DEFAULT_DIALOGS {
            resources
                .dialogs
                .insert(name.to_string(), parse_dialog(content));
        }
        resources
    }

    /// Load the resources for the configured language.
    ///
    /// Files in the optional resource directory replace the compiled-in resources with the same
    /// name.
    pub fn load(settings: &SkillSettings) -> Result<Self, ServiceError> {
        let mut resources = Self::embedded();

        let Some(dir) = settings.resource_dir.as_ref() else {
            if !settings.lang.eq_ignore_ascii_case(DEF_LANG) {
                warn!(
                    "No resource directory configured for language {}, using {DEF_LANG}",
                    settings.lang
                );
            }
            return Ok(resources);
        };

        let vocab_dir = dir.join("vocab").join(&settings.lang);
        for (name, content) in read_resource_files(&vocab_dir, VOCAB_EXT)? {
            debug!("Vocabulary override: {name}");
            resources.vocabulary.insert(name, parse_vocab(&content));
        }
        let dialog_dir = dir.join("dialog").join(&settings.lang);
        for (name, content) in read_resource_files(&dialog_dir, DIALOG_EXT)? {
            debug!("Dialog override: {name}");
            resources.dialogs.insert(name, parse_dialog(&content));
        }

        info!(
            "Loaded {} vocabularies and {} dialogs ({})",
            resources.vocabulary.len(),
            resources.dialogs.len(),
            settings.lang
        );
        Ok(resources)
    }

    /// Vocabulary entries by vocabulary name, ordered by name.
    pub fn vocabulary(&self) -> impl Iterator<Item = (&str, &[VocabEntry])> {
        self.vocabulary
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    pub fn vocab_entries(&self, name: &str) -> Option<&[VocabEntry]> {
        self.vocabulary.get(name).map(|v| v.as_slice())
    }

    /// Render a dialog with the given template data.
    ///
    /// Dialogs with multiple lines rotate through their lines on every call. An unknown dialog is
    /// rendered as its name with dots replaced by spaces.
    pub fn render_dialog(&mut self, name: &str, data: &Map<String, Value>) -> String {
        let Some(lines) = self.dialogs.get(name).filter(|l| !l.is_empty()) else {
            warn!("Dialog not found: {name}");
            return name.replace('.', " ");
        };

        let index = self.next_line.entry(name.to_string()).or_default();
        let template = &lines[*index % lines.len()];
        *index = (*index + 1) % lines.len();

        fill_template(template, data)
    }
}

/// Parse a vocabulary file: one phrase per line, `|` separates aliases. Empty lines and `#`
/// comments are ignored.
pub fn parse_vocab(content: &str) -> Vec<VocabEntry> {
    content_lines(content)
        .filter_map(|line| {
            let mut parts = line
                .split('|')
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty());
            let phrase = parts.next()?;
            Some(VocabEntry {
                phrase,
                aliases: parts.collect(),
            })
        })
        .collect()
}

fn parse_dialog(content: &str) -> Vec<String> {
    content_lines(content).map(|l| l.to_string()).collect()
}

fn content_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

/// Substitute `{{key}}` and `{key}` placeholders. Unknown placeholders are kept.
pub fn fill_template(template: &str, data: &Map<String, Value>) -> String {
    let mut text = template.to_string();
    for (key, value) in data {
        let value = match value {
            Value::String(s) => s.clone(),
            v => v.to_string(),
        };
        text = text
            .replace(&format!("{{{{{key}}}}}"), &value)
            .replace(&format!("{{{key}}}"), &value);
    }
    text
}

/// Read all files with the given extension. Returns the file stem & content.
fn read_resource_files(dir: &Path, extension: &str) -> Result<Vec<(String, String)>, ServiceError> {
    if !dir.is_dir() {
        debug!("Resource directory not found: {dir:?}");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        files.push((name.to_string(), fs::read_to_string(&path)?));
    }
    Ok(files)
}
