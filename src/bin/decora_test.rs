// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Decora WiFi cloud connection test tool

use anyhow::{Context, anyhow, bail};
use clap::{Arg, Command};
use decora_wifi_skill::APP_VERSION;
use decora_wifi_skill::cloud::{DecoraApi, DecoraClient};
use decora_wifi_skill::configuration::{Settings, get_configuration};
use decora_wifi_skill::dispatcher::command_for;
use decora_wifi_skill::intent::{IntentKind, IntentMessage};
use decora_wifi_skill::resolver::resolve_switch;
use log::info;
use std::time::Duration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let (cfg, command) = parse_args_load_cfg()?;
    let credentials = cfg
        .decora
        .credentials()
        .ok_or_else(|| anyhow!("Email and password are required"))?;

    let api = DecoraClient::new(
        &cfg.decora.api_url,
        Duration::from_secs(cfg.decora.request_timeout as u64),
    )?;

    let session = api
        .login(&credentials.email, &credentials.password)
        .await
        .context("Login failed")?;
    let permissions = api.residential_permissions(&session).await?;
    info!("Residential permissions: {permissions:?}");

    let result = async {
        let switch =
            resolve_switch(&api, &session, &permissions, &cfg.decora.selection_policy()).await?;
        println!("Switch: {switch:?}");

        if let Some(intent) = command {
            let Some(cmd) = command_for(&intent) else {
                bail!("Invalid command value: '{}'", intent.utterance);
            };
            let switch = api
                .update_attributes(&session, switch.id, &cmd.attributes)
                .await?;
            println!("{}: {switch:?}", cmd.confirmation.log);
        }
        Ok(())
    }
    .await;

    api.logout(&session).await?;
    result
}

fn parse_args_load_cfg() -> anyhow::Result<(Settings, Option<IntentMessage>)> {
    let args = Command::new("decora-test")
        .author("Unfolded Circle ApS")
        .version(APP_VERSION)
        .about("Decora WiFi cloud communication test")
        .arg(
            Arg::new("config")
                .short('c')
                .help("Configuration file"),
        )
        .arg(
            Arg::new("email")
                .short('e')
                .help("Account email (overrides configuration file)"),
        )
        .arg(
            Arg::new("password")
                .short('p')
                .help("Account password (overrides configuration file)"),
        )
        .arg(
            Arg::new("switch")
                .short('s')
                .help("Switch name, otherwise the first switch is used"),
        )
        .arg(
            Arg::new("command")
                .value_parser(["on", "off", "dim", "set"])
                .help("Switch command"),
        )
        .arg(Arg::new("value").help("Brightness for the set command"))
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let cfg_file = args.get_one::<String>("config").map(|s| s.as_str());
    let mut cfg = get_configuration(cfg_file)?;
    if let Some(email) = args.get_one::<String>("email") {
        cfg.decora.email = email.clone();
    }
    if let Some(password) = args.get_one::<String>("password") {
        cfg.decora.password = password.clone();
    }
    if let Some(name) = args.get_one::<String>("switch") {
        cfg.decora.switch_name = Some(name.clone());
    }

    let command = args.get_one::<String>("command").map(|cmd| {
        let kind = match cmd.as_str() {
            "on" => IntentKind::On,
            "off" => IntentKind::Off,
            "dim" => IntentKind::Dim,
            _ => IntentKind::Set,
        };
        IntentMessage {
            kind,
            utterance: args.get_one::<String>("value").cloned().unwrap_or_default(),
            keywords: Default::default(),
            tags: Vec::new(),
        }
    });

    Ok((cfg, command))
}
