// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Switch resolution: walk the permission → residential account → residence → switch hierarchy
//! of the Decora WiFi account and select the switch to control.

use crate::cloud::{DecoraApi, IotSwitch, ResidentialPermission, Session};
use crate::errors::ServiceError;
use log::{debug, info};

/// Which switch of the account hierarchy is controlled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// First switch of the first residence of the first permission's residential account.
    ///
    /// Additional permissions, residences and switches are ignored.
    #[default]
    First,
    /// First switch with the given name (case-insensitive) in any residence.
    ByName(String),
}

/// Resolve the switch to control.
///
/// Returns [`ServiceError::NotFound`] if the selection policy doesn't yield a switch, for example
/// if a collection in the hierarchy is empty.
pub async fn resolve_switch<A: DecoraApi>(
    api: &A,
    session: &Session,
    permissions: &[ResidentialPermission],
    policy: &SelectionPolicy,
) -> Result<IotSwitch, ServiceError> {
    let switch = match policy {
        SelectionPolicy::First => first_switch(api, session, permissions).await?,
        SelectionPolicy::ByName(name) => switch_by_name(api, session, permissions, name).await?,
    };
    info!("Using switch '{}' ({})", switch.name, switch.id);
    Ok(switch)
}

async fn first_switch<A: DecoraApi>(
    api: &A,
    session: &Session,
    permissions: &[ResidentialPermission],
) -> Result<IotSwitch, ServiceError> {
    let permission = permissions
        .first()
        .ok_or_else(|| ServiceError::NotFound("No residential permission".into()))?;
    let account_id = permission.residential_account_id.ok_or_else(|| {
        ServiceError::NotFound(format!(
            "Permission {} has no residential account",
            permission.id
        ))
    })?;

    let residences = api.residences(session, account_id).await?;
    info!("Residences found: {residences:?}");
    let residence = residences.into_iter().next().ok_or_else(|| {
        ServiceError::NotFound(format!("No residence in residential account {account_id}"))
    })?;

    let switches = api.iot_switches(session, residence.id).await?;
    info!("Switches found: {switches:?}");
    switches.into_iter().next().ok_or_else(|| {
        ServiceError::NotFound(format!("No switch in residence '{}'", residence.name))
    })
}

async fn switch_by_name<A: DecoraApi>(
    api: &A,
    session: &Session,
    permissions: &[ResidentialPermission],
    name: &str,
) -> Result<IotSwitch, ServiceError> {
    let name = name.to_lowercase();
    for permission in permissions {
        let Some(account_id) = permission.residential_account_id else {
            debug!("Skipping permission {} without residential account", permission.id);
            continue;
        };
        for residence in api.residences(session, account_id).await? {
            let switches = api.iot_switches(session, residence.id).await?;
            if let Some(switch) = switches
                .into_iter()
                .find(|s| s.name.to_lowercase() == name)
            {
                return Ok(switch);
            }
        }
    }

    Err(ServiceError::NotFound(format!("No switch named '{name}'")))
}
