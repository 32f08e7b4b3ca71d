// Copyright (c) 2023 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use crate::errors::ServiceError;
use rustls::ClientConfig;
use rustls_platform_verifier::ConfigVerifierExt;
use std::sync::Arc;
use std::time::Duration;

/// Create a HTTP client for REST requests.
///
/// The `timeout` applies to the total request time, including connection establishment.
pub fn new_http_client(timeout: Duration, tls: bool) -> Result<awc::Client, ServiceError> {
    let builder = awc::ClientBuilder::new()
        .timeout(timeout)
        .add_default_header(("accept", "application/json"));
    if tls {
        let connector = awc::Connector::new()
            .timeout(timeout)
            .rustls_0_23(Arc::new(tls_client_config()?));
        return Ok(builder.connector(connector).finish());
    }
    Ok(builder.finish())
}

/// Create a WebSocket client for the message bus connection.
pub fn new_websocket_client(
    connection_timeout: Duration,
    tls: bool,
) -> Result<awc::Client, ServiceError> {
    if tls {
        let connector = awc::Connector::new().rustls_0_23(Arc::new(tls_client_config()?));
        Ok(awc::ClientBuilder::new()
            .timeout(connection_timeout)
            .connector(connector)
            .finish())
    } else {
        Ok(awc::ClientBuilder::new()
            .timeout(connection_timeout)
            .finish())
    }
}

/// TLS configuration using the operating system's certificate verifier.
fn tls_client_config() -> Result<ClientConfig, ServiceError> {
    let mut config = ClientConfig::with_platform_verifier().map_err(|e| {
        ServiceError::InternalServerError(format!("Error creating TLS configuration: {e}"))
    })?;
    // http2 has (or at least had) issues with wss. Needs further investigation.
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn plain_clients_without_tls_connector() {
        assert!(new_http_client(Duration::from_secs(5), false).is_ok());
        assert!(new_websocket_client(Duration::from_secs(5), false).is_ok());
    }
}
