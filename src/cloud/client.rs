// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! HTTP implementation of the Decora WiFi cloud API with the actix web client.

use crate::cloud::model::{CLIENT_ID, LoginRequest, LoginResponse, REGISTERED_VIA};
use crate::cloud::{DecoraApi, IotSwitch, Residence, ResidentialPermission, Session, SwitchAttributes};
use crate::errors::ServiceError;
use crate::util::new_http_client;
use awc::ClientResponse;
use awc::error::PayloadError;
use awc::http::StatusCode;
use bytes::Bytes;
use futures::Stream;
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Max accepted JSON response size. Accounts with many switches return large lists.
const MAX_RESPONSE_SIZE: usize = 1024 * 1024;

#[derive(Clone)]
pub struct DecoraClient {
    client: awc::Client,
    /// API base address without trailing slash, e.g. `https://my.leviton.com/api`
    base_url: String,
}

impl DecoraClient {
    pub fn new(api_url: &Url, request_timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            client: new_http_client(request_timeout, api_url.scheme() == "https")?,
            base_url: api_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
    ) -> Result<T, ServiceError> {
        debug!("GET /{path}");
        let response = self
            .client
            .get(self.url(path))
            .insert_header(("authorization", session.token.as_str()))
            .send()
            .await?;
        read_json(response, path).await
    }
}

impl DecoraApi for DecoraClient {
    async fn login(&self, email: &str, password: &str) -> Result<Session, ServiceError> {
        debug!("POST /Person/login");
        let response = self
            .client
            .post(self.url("Person/login?include=user"))
            .send_json(&LoginRequest {
                email,
                password,
                client_id: CLIENT_ID,
                registered_via: REGISTERED_VIA,
            })
            .await?;
        let login: LoginResponse = read_json(response, "Person/login").await?;
        info!("Logged in to Decora WiFi service, user id: {}", login.user_id);

        Ok(Session::new(login.id, login.user_id))
    }

    async fn logout(&self, session: &Session) -> Result<(), ServiceError> {
        debug!("POST /Person/logout");
        let mut response = self
            .client
            .post(self.url("Person/logout"))
            .insert_header(("authorization", session.token.as_str()))
            .send()
            .await?;
        check_status(&mut response, "Person/logout").await
    }

    async fn residential_permissions(
        &self,
        session: &Session,
    ) -> Result<Vec<ResidentialPermission>, ServiceError> {
        self.get(
            session,
            &format!("Person/{}/residentialPermissions", session.user_id),
        )
        .await
    }

    async fn residences(
        &self,
        session: &Session,
        account_id: u64,
    ) -> Result<Vec<Residence>, ServiceError> {
        self.get(session, &format!("ResidentialAccounts/{account_id}/residences"))
            .await
    }

    async fn iot_switches(
        &self,
        session: &Session,
        residence_id: u64,
    ) -> Result<Vec<IotSwitch>, ServiceError> {
        self.get(session, &format!("Residences/{residence_id}/iotSwitches"))
            .await
    }

    async fn update_attributes(
        &self,
        session: &Session,
        switch_id: u64,
        attributes: &SwitchAttributes,
    ) -> Result<IotSwitch, ServiceError> {
        let path = format!("IotSwitches/{switch_id}");
        debug!("PUT /{path}: {attributes:?}");
        let response = self
            .client
            .put(self.url(&path))
            .insert_header(("authorization", session.token.as_str()))
            .send_json(attributes)
            .await?;
        read_json(response, &path).await
    }
}

async fn read_json<T, S>(mut response: ClientResponse<S>, operation: &str) -> Result<T, ServiceError>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Bytes, PayloadError>> + Unpin,
{
    check_status(&mut response, operation).await?;
    Ok(response.json::<T>().limit(MAX_RESPONSE_SIZE).await?)
}

/// Map a non-successful HTTP response to a [`ServiceError`].
///
/// - 401: the access token or the login credentials were rejected
/// - 404: the requested object doesn't exist (anymore)
async fn check_status<S>(
    response: &mut ClientResponse<S>,
    operation: &str,
) -> Result<(), ServiceError>
where
    S: Stream<Item = Result<Bytes, PayloadError>> + Unpin,
{
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response
        .body()
        .limit(4096)
        .await
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .unwrap_or_default();

    Err(match status {
        StatusCode::UNAUTHORIZED => {
            ServiceError::AuthenticationFailed(format!("{operation}: {body}"))
        }
        StatusCode::NOT_FOUND => ServiceError::NotFound(operation.to_string()),
        _ => ServiceError::ServiceUnavailable(format!("{operation} failed with HTTP {status}: {body}")),
    })
}
