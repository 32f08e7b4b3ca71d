// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

#![forbid(non_ascii_idents)]
#![deny(unsafe_code)]

use std::io;
use std::path::Path;
use std::time::Duration;

use actix::Actor;
use clap::{Command, arg};
use decora_wifi_skill::cloud::DecoraClient;
use decora_wifi_skill::configuration::{
    DEF_CONFIG_FILE, ENV_BUS_MSG_TRACING, get_configuration,
};
use decora_wifi_skill::util::msg_tracing_from_env;
use decora_wifi_skill::{APP_VERSION, Connect, Shutdown, Skill, built_info};
use log::{error, info, warn};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let args = Command::new(built_info::PKG_NAME)
        .author("Unfolded Circle ApS")
        .version(APP_VERSION)
        .about("Decora WiFi light switch voice skill")
        .arg(arg!(-c --config <FILE> "Configuration file").required(false))
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg_file = match args.get_one::<String>("config") {
        None => {
            if Path::new(DEF_CONFIG_FILE).exists() {
                info!("Loading default configuration file: {DEF_CONFIG_FILE}");
                Some(DEF_CONFIG_FILE)
            } else {
                None
            }
        }
        Some(c) => Some(c.as_str()),
    };
    let cfg = get_configuration(cfg_file).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to read configuration: {e}"),
        )
    })?;

    info!("{} {APP_VERSION} starting", built_info::PKG_NAME);

    let api = DecoraClient::new(
        &cfg.decora.api_url,
        Duration::from_secs(cfg.decora.request_timeout as u64),
    )
    .map_err(|e| io::Error::other(e.to_string()))?;
    let skill = Skill::new(cfg, api, msg_tracing_from_env(ENV_BUS_MSG_TRACING))
        .map_err(|e| io::Error::other(e.to_string()))?
        .start();

    if let Err(e) = skill.send(Connect).await.map_err(io::Error::other)? {
        // reconnection is handled by the skill
        warn!("Message bus not yet available: {e}");
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    if let Err(e) = skill.send(Shutdown).await {
        error!("Error detaching skill: {e}");
    }
    // let the bus client send the close frame
    actix_web::rt::time::sleep(Duration::from_millis(200)).await;

    Ok(())
}
