// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Configuration file handling.

use crate::errors::ServiceError;
use crate::resolver::SelectionPolicy;
use config::Config;
use log::{error, info, warn};
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use url::Url;

/// Default configuration file.
pub const DEF_CONFIG_FILE: &str = "configuration.yaml";

pub const DEF_BUS_URL: &str = "ws://localhost:8181/core";

pub const DEF_API_URL: &str = "https://my.leviton.com/api";

pub const DEF_SKILL_ID: &str = "decora-wifi-skill";

const ENV_USER_CFG_FILENAME: &str = "DECORA_USER_CFG_FILENAME";
const DEV_USER_CFG_FILENAME: &str = "decora-skill.json";

/// Environment variable for the user configuration directory.
///
/// Credentials received from the host's settings service are stored in this directory.
const ENV_CONFIG_HOME: &str = "DECORA_CONFIG_HOME";

/// Environment variable to enable message bus tracing.
///
/// Valid values:
/// - `all`: enable incoming and outgoing message traces
/// - `in`: only incoming messages
/// - `out`: only outgoing messages
///
/// **Attention:** this setting is only for debugging and exposes all data, including credentials!
pub const ENV_BUS_MSG_TRACING: &str = "DECORA_BUS_MSG_TRACING";

#[derive(Default, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    pub skill: SkillSettings,
    pub bus: MessageBusSettings,
    pub decora: DecoraSettings,
}

#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct SkillSettings {
    /// Skill identifier used to namespace intents and vocabulary on the message bus.
    pub id: String,
    /// Language of the vocabulary and dialog files.
    pub lang: String,
    /// Optional directory with `vocab/<lang>/*.voc` and `dialog/<lang>/*.dialog` files.
    /// The compiled-in resources are used if not set.
    pub resource_dir: Option<PathBuf>,
}

impl Default for SkillSettings {
    fn default() -> Self {
        Self {
            id: DEF_SKILL_ID.to_string(),
            lang: "en-us".to_string(),
            resource_dir: None,
        }
    }
}

#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct MessageBusSettings {
    pub url: Url,
    /// WebSocket connection timeout in seconds.
    pub connection_timeout: u8,
    pub max_frame_size_kb: usize,
    pub reconnect: ReconnectSettings,
    pub heartbeat: HeartbeatSettings,
}

impl Default for MessageBusSettings {
    fn default() -> Self {
        Self {
            url: Url::parse(DEF_BUS_URL).expect("valid default bus url"),
            connection_timeout: 6,
            max_frame_size_kb: 1024,
            reconnect: Default::default(),
            heartbeat: Default::default(),
        }
    }
}

#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct DecoraSettings {
    pub api_url: Url,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// HTTP request timeout in seconds, including connection establishment.
    pub request_timeout: u8,
    /// Name of the switch to control. The first switch found is used if not set.
    #[serde(default)]
    pub switch_name: Option<String>,
}

impl Default for DecoraSettings {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEF_API_URL).expect("valid default api url"),
            email: "".to_string(),
            password: "".to_string(),
            request_timeout: 10,
            switch_name: None,
        }
    }
}

impl Debug for DecoraSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoraSettings")
            .field("api_url", &self.api_url.as_str())
            .field("email", &self.email)
            .field("password", &"***")
            .field("request_timeout", &self.request_timeout)
            .field("switch_name", &self.switch_name)
            .finish()
    }
}

impl DecoraSettings {
    /// Returns the login credentials if both email and password are set.
    pub fn credentials(&self) -> Option<Credentials> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return None;
        }
        Some(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        match self.switch_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => SelectionPolicy::ByName(name.to_string()),
            _ => SelectionPolicy::First,
        }
    }
}

/// Decora WiFi account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[serde_as]
#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct ReconnectSettings {
    /// Maximum number of reconnection attempts. 0 = unlimited.
    pub attempts: u32,
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "duration_ms")]
    pub duration: Duration,
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "duration_max_ms")]
    pub duration_max: Duration,
    pub backoff_factor: f32,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            attempts: 0,
            duration: Duration::from_secs(1),
            duration_max: Duration::from_secs(30),
            backoff_factor: 1.5,
        }
    }
}

/// WebSocket heartbeat settings for sending ping frames.
#[serde_as]
#[derive(Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct HeartbeatSettings {
    /// How often heartbeat pings are sent
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "interval_sec")]
    pub interval: Duration,
    /// How long before lack of server response causes a timeout
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "timeout_sec")]
    pub timeout: Duration,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(20),
            timeout: Duration::from_secs(40),
        }
    }
}

impl Display for HeartbeatSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Heartbeat interval={:?}, timeout={:?}",
            self.interval, self.timeout
        )
    }
}

/// Load the configuration settings.
///
/// The application provides default values which can be overriden in the following order:
/// 1. Configuration settings in the read-only yaml configuration file specified in `filename`
/// 2. User provided credentials received from the host's settings service
/// 3. Environment variables with prefix `DECORA_` (works only for cfg keys not containing a `_`!)
///
/// If there's a configuration load error, the configuration will be reloaded without the user
/// provided configuration settings for auto-recovery with default values.
pub fn get_configuration(filename: Option<&str>) -> Result<Settings, config::ConfigError> {
    let user_config = user_settings_path();
    if !user_config.is_file() {
        info!("No user settings file found");
        return load_configuration(filename, None);
    }

    match load_configuration(filename, Some(user_config)) {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            error!("Error loading configuration, retrying without user configuration. Error: {e}");
            load_configuration(filename, None)
        }
    }
}

fn load_configuration(
    filename: Option<&str>,
    user_config: Option<PathBuf>,
) -> Result<Settings, config::ConfigError> {
    // default configuration
    let mut config = Config::builder().add_source(Config::try_from(&Settings::default())?);
    // read optional configuration file to override defaults
    if let Some(filename) = filename {
        config = config.add_source(config::File::with_name(filename));
    }

    // Overlay credentials received from the settings service.
    if let Some(user_config) = user_config {
        config = config.add_source(config::File::from(user_config));
    }

    // E.g. `DECORA_DECORA_EMAIL=me@example.com` would set the `decora.email` key
    let config = config
        .add_source(config::Environment::with_prefix("DECORA").separator("_"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;

    check_cfg_values(settings)
}

fn check_cfg_values(mut settings: Settings) -> Result<Settings, config::ConfigError> {
    if settings.bus.reconnect.backoff_factor < 1.0
        || settings.bus.reconnect.duration.as_millis() < 100
        || settings.bus.reconnect.duration_max.as_millis() < 1000
    {
        warn!("Invalid message bus reconnect settings, using defaults.");
        settings.bus.reconnect = Default::default();
    }

    if settings.bus.heartbeat.interval.as_secs() < 5
        || settings.bus.heartbeat.timeout.as_secs() < 5
        || settings.bus.heartbeat.timeout.as_secs() <= settings.bus.heartbeat.interval.as_secs()
    {
        warn!("Invalid message bus heartbeat settings, using defaults.");
        settings.bus.heartbeat = Default::default();
    }

    if settings.decora.request_timeout == 0 {
        warn!("Invalid Decora request timeout, using default.");
        settings.decora.request_timeout = DecoraSettings::default().request_timeout;
    }

    match settings.bus.url.scheme() {
        "ws" | "wss" => {}
        scheme => {
            return Err(config::ConfigError::Message(format!(
                "invalid scheme in bus.url: {scheme}. Valid: [ws, wss]"
            )));
        }
    }

    match settings.decora.api_url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(config::ConfigError::Message(format!(
                "invalid scheme in decora.api_url: {scheme}. Valid: [http, https]"
            )));
        }
    }

    if settings.skill.id.trim().is_empty() {
        settings.skill.id = DEF_SKILL_ID.to_string();
    }

    Ok(settings)
}

/// Wrapper to add the `decora` root property to make it compatible with the main configuration file.
#[derive(serde::Deserialize, serde::Serialize)]
struct UserSettingsWrapper {
    decora: UserCredentials,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct UserCredentials {
    email: String,
    password: String,
}

/// Store credentials received from the settings service.
pub fn save_user_settings(credentials: &Credentials) -> Result<(), ServiceError> {
    let cfg = UserSettingsWrapper {
        decora: UserCredentials {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
        },
    };
    fs::write(user_settings_path(), serde_json::to_string_pretty(&cfg)?).map_err(|e| {
        let msg = format!("Error saving user configuration: {e}");
        error!("{msg}");
        ServiceError::InternalServerError(msg)
    })?;
    Ok(())
}

/// Get user configuration file path.
///
/// The configuration file is located in the configuration directory specified in the env variable
/// `DECORA_CONFIG_HOME`. If not set, the current directory is used.
fn user_settings_path() -> PathBuf {
    let file = env::var(ENV_USER_CFG_FILENAME).unwrap_or(DEV_USER_CFG_FILENAME.into());
    Path::new(&env::var(ENV_CONFIG_HOME).unwrap_or_default()).join(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn credentials_require_email_and_password() {
        let mut cfg = DecoraSettings::default();
        assert_eq!(None, cfg.credentials());

        cfg.email = "me@example.com".into();
        assert_eq!(None, cfg.credentials(), "password must be required");

        cfg.password = "secret".into();
        cfg.email = "  me@example.com ".into();
        assert_eq!(
            Some(Credentials {
                email: "me@example.com".into(),
                password: "secret".into()
            }),
            cfg.credentials()
        );
    }

    #[rstest]
    #[case(None, SelectionPolicy::First)]
    #[case(Some(""), SelectionPolicy::First)]
    #[case(Some("  "), SelectionPolicy::First)]
    #[case(Some(" Kitchen "), SelectionPolicy::ByName("Kitchen".into()))]
    fn selection_policy_from_switch_name(
        #[case] switch_name: Option<&str>,
        #[case] expected: SelectionPolicy,
    ) {
        let cfg = DecoraSettings {
            switch_name: switch_name.map(|v| v.to_string()),
            ..Default::default()
        };
        assert_eq!(expected, cfg.selection_policy());
    }

    #[test]
    fn debug_output_hides_password() {
        let cfg = DecoraSettings {
            password: "top-secret".into(),
            ..Default::default()
        };
        let output = format!("{cfg:?}");
        assert!(!output.contains("top-secret"), "password leaked: {output}");
    }

    #[test]
    fn invalid_bus_scheme_returns_error() {
        let mut settings = Settings::default();
        settings.bus.url = Url::parse("http://localhost:8181/core").unwrap();
        assert!(check_cfg_values(settings).is_err());
    }

    #[test]
    fn invalid_heartbeat_settings_are_reset() {
        let mut settings = Settings::default();
        settings.bus.heartbeat.interval = Duration::from_secs(30);
        settings.bus.heartbeat.timeout = Duration::from_secs(10);
        let settings = check_cfg_values(settings).expect("valid settings");
        assert_eq!(Duration::from_secs(20), settings.bus.heartbeat.interval);
        assert_eq!(Duration::from_secs(40), settings.bus.heartbeat.timeout);
    }
}
