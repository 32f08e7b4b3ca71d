// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! In-memory Decora WiFi cloud for unit tests.

use crate::cloud::{
    DecoraApi, IotSwitch, Power, Residence, ResidentialPermission, Session, SwitchAttributes,
};
use crate::errors::ServiceError;
use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

pub(crate) const EMAIL: &str = "me@example.com";
pub(crate) const PASSWORD: &str = "secret";

#[derive(Default)]
pub(crate) struct FakeCloud {
    pub permissions: Vec<ResidentialPermission>,
    /// Residences by account id
    pub residences: HashMap<u64, Vec<Residence>>,
    /// Switches by residence id
    pub switches: HashMap<u64, Vec<IotSwitch>>,
    /// Applied attribute updates: switch id & attributes
    pub updates: Vec<(u64, SwitchAttributes)>,
    /// Error returned by the next update call
    pub update_error: Option<ServiceError>,
    /// Response time of update calls
    pub update_delay: Option<Duration>,
    pub logins: u32,
    pub logouts: u32,
    /// Number of residence & switch listing calls
    pub lookups: u32,
}

#[derive(Clone, Default)]
pub(crate) struct FakeApi {
    cloud: Rc<RefCell<FakeCloud>>,
}

impl FakeApi {
    /// One account with one residence containing one switch with id 100.
    pub fn single_switch() -> Self {
        let api = Self::default();
        {
            let mut cloud = api.cloud();
            cloud.permissions = vec![permission(1, 1)];
            cloud.residences.insert(1, vec![residence(10, "Home")]);
            cloud.switches.insert(10, vec![switch(100, "Living room")]);
        }
        api
    }

    pub fn cloud(&self) -> RefMut<'_, FakeCloud> {
        self.cloud.borrow_mut()
    }
}

pub(crate) fn permission(id: u64, account_id: u64) -> ResidentialPermission {
    ResidentialPermission {
        id,
        access: Some("owner".into()),
        residential_account_id: Some(account_id),
        residence_id: None,
    }
}

pub(crate) fn residence(id: u64, name: &str) -> Residence {
    Residence {
        id,
        name: name.into(),
    }
}

pub(crate) fn switch(id: u64, name: &str) -> IotSwitch {
    IotSwitch {
        id,
        name: name.into(),
        model: Some("DW6HD".into()),
        power: Some(Power::Off),
        brightness: Some(50),
        ..Default::default()
    }
}

impl DecoraApi for FakeApi {
    async fn login(&self, email: &str, password: &str) -> Result<Session, ServiceError> {
        let mut cloud = self.cloud();
        // any account with the test password
        if email.is_empty() || password != PASSWORD {
            return Err(ServiceError::AuthenticationFailed("login failed".into()));
        }
        cloud.logins += 1;
        Ok(Session::new(format!("token-{}", cloud.logins), 5))
    }

    async fn logout(&self, _session: &Session) -> Result<(), ServiceError> {
        self.cloud().logouts += 1;
        Ok(())
    }

    async fn residential_permissions(
        &self,
        _session: &Session,
    ) -> Result<Vec<ResidentialPermission>, ServiceError> {
        Ok(self.cloud().permissions.clone())
    }

    async fn residences(
        &self,
        _session: &Session,
        account_id: u64,
    ) -> Result<Vec<Residence>, ServiceError> {
        let mut cloud = self.cloud();
        cloud.lookups += 1;
        Ok(cloud.residences.get(&account_id).cloned().unwrap_or_default())
    }

    async fn iot_switches(
        &self,
        _session: &Session,
        residence_id: u64,
    ) -> Result<Vec<IotSwitch>, ServiceError> {
        let mut cloud = self.cloud();
        cloud.lookups += 1;
        Ok(cloud.switches.get(&residence_id).cloned().unwrap_or_default())
    }

    async fn update_attributes(
        &self,
        _session: &Session,
        switch_id: u64,
        attributes: &SwitchAttributes,
    ) -> Result<IotSwitch, ServiceError> {
        let delay = self.cloud().update_delay;
        if let Some(delay) = delay {
            actix_web::rt::time::sleep(delay).await;
        }
        let mut cloud = self.cloud();
        if let Some(e) = cloud.update_error.take() {
            return Err(e);
        }
        cloud.updates.push((switch_id, attributes.clone()));
        let mut switch = cloud
            .switches
            .values()
            .flatten()
            .find(|s| s.id == switch_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("IotSwitches/{switch_id}")))?;
        if attributes.power.is_some() {
            switch.power = attributes.power;
        }
        if attributes.brightness.is_some() {
            switch.brightness = attributes.brightness;
        }
        Ok(switch)
    }
}
