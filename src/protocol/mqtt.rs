// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport for Tasmota shutters.

use rumqttc::{AsyncClient, LastWill, MqttOptions, QoS};

use crate::config::MqttSettings;
use crate::error::ProtocolError;
use crate::protocol::Transport;

/// Publishes shutter commands through a `rumqttc` client.
///
/// Messages are queued with [`AsyncClient::try_publish`] and
/// [`AsyncClient::try_subscribe`], so nothing waits on the network.
/// Delivery happens when the event loop runs.
#[derive(Debug, Clone)]
pub struct MqttTransport {
    client: AsyncClient,
}

impl MqttTransport {
    /// Wraps an existing client.
    #[must_use]
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

impl Transport for MqttTransport {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
        tracing::debug!(topic = %topic, payload = %payload, "Publishing MQTT command");

        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload.to_owned())
            .map_err(ProtocolError::Mqtt)
    }

    fn subscribe(&self, filter: &str) -> Result<(), ProtocolError> {
        self.client.try_subscribe(filter, QoS::AtLeastOnce)?;
        tracing::debug!(filter = %filter, "Queued MQTT subscription");
        Ok(())
    }
}

/// Parses an MQTT URL into host and port.
///
/// Accepts `mqtt://host:port`, `tcp://host:port`, `host:port` and `host`
/// (port 1883).
///
/// # Errors
///
/// Returns `ProtocolError::InvalidAddress` if the host is empty or the port
/// is not a number.
pub fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url)
        .trim_end_matches('/');

    let (host, port) = if let Some((h, p)) = url.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (url.to_string(), 1883)
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress(
            "MQTT broker host is required".to_string(),
        ));
    }

    Ok((host, port))
}

/// Builds `rumqttc` options for a broker URL and session settings.
///
/// # Errors
///
/// Returns `ProtocolError::InvalidAddress` if the URL cannot be parsed.
pub fn mqtt_options(broker_url: &str, settings: &MqttSettings) -> Result<MqttOptions, ProtocolError> {
    let (host, port) = parse_mqtt_url(broker_url)?;

    let mut options = MqttOptions::new(&settings.client_id, host, port);
    options.set_keep_alive(settings.keep_alive);
    options.set_clean_session(settings.clean_session);

    if let Some((username, password)) = &settings.credentials {
        options.set_credentials(username, password);
    }

    if let Some(will) = &settings.last_will {
        options.set_last_will(LastWill::new(
            &will.topic,
            will.payload.clone(),
            QoS::AtLeastOnce,
            will.retain,
        ));
    }

    Ok(options)
}
