// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory configuration.
//!
//! The accessory host stores one JSON object per configured shutter and
//! hands it over as-is. Key names follow the host's camelCase convention.
//!
//! # Examples
//!
//! ```
//! use tasmota_blinds::config::AccessoryConfig;
//!
//! let config = AccessoryConfig::from_json(r#"{
//!     "name": "Office blinds",
//!     "mqttBrokerUrl": "mqtt://192.168.1.50:1883",
//!     "mqttTopic": "Office"
//! }"#).unwrap();
//!
//! assert_eq!(config.shutter_index(), "1");
//! assert!(config.manufacturer().is_empty());
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::accessory::AccessoryInformation;
use crate::error::ConfigError;

/// Configuration of one shutter accessory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryConfig {
    name: String,
    #[serde(default)]
    manufacturer: String,
    #[serde(default)]
    model: String,
    #[serde(rename = "serialNumberMAC", default)]
    serial_number_mac: String,

    mqtt_broker_url: String,
    #[serde(default)]
    mqtt_username: Option<String>,
    #[serde(default)]
    mqtt_password: Option<String>,
    #[serde(default)]
    mqtt_last_will: Option<LastWillConfig>,

    #[serde(default)]
    mqtt_topic: Option<String>,
    #[serde(default = "default_shutter_index", deserialize_with = "string_or_number")]
    mqtt_shutter_index: String,
    #[serde(default)]
    mqtt_result_topic: Option<String>,
    #[serde(default)]
    mqtt_command_topic: Option<String>,
    #[serde(default)]
    mqtt_tele_topic: Option<String>,
    #[serde(default)]
    mqtt_shutter_name: Option<String>,
}

/// Message the broker publishes on our behalf if the connection drops.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastWillConfig {
    /// Topic to publish the will on.
    pub topic: String,
    /// Will payload.
    pub payload: String,
    /// Whether the broker retains the will.
    #[serde(default)]
    pub retain: bool,
}

fn default_shutter_index() -> String {
    "1".to_string()
}

/// Accepts `"2"` as well as `2` for the shutter index.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Index {
        Text(String),
        Number(u64),
    }

    Ok(match Index::deserialize(deserializer)? {
        Index::Text(s) => s,
        Index::Number(n) => n.to_string(),
    })
}

impl AccessoryConfig {
    /// Parses and validates a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed or a required key is
    /// missing.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration from an already decoded value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the value has the wrong shape or a required
    /// key is missing.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the cross-field requirements serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField("name"));
        }
        if self.mqtt_broker_url.trim().is_empty() {
            return Err(ConfigError::MissingField("mqttBrokerUrl"));
        }
        if self.mqtt_shutter_index.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "mqttShutterIndex",
                message: "must not be empty".to_string(),
            });
        }

        let topics_overridden = self.mqtt_result_topic.is_some()
            && self.mqtt_command_topic.is_some()
            && self.mqtt_tele_topic.is_some();
        let has_topic = self
            .mqtt_topic
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !has_topic && !topics_overridden {
            return Err(ConfigError::MissingField("mqttTopic"));
        }

        if self.mqtt_password.is_some() && self.mqtt_username.is_none() {
            return Err(ConfigError::InvalidValue {
                key: "mqttPassword",
                message: "a password requires mqttUsername".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the accessory display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the manufacturer string (empty if unset).
    #[must_use]
    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    /// Returns the model string (empty if unset).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the serial number string (empty if unset).
    #[must_use]
    pub fn serial_number(&self) -> &str {
        &self.serial_number_mac
    }

    /// Returns the MQTT broker URL.
    #[must_use]
    pub fn broker_url(&self) -> &str {
        &self.mqtt_broker_url
    }

    /// Returns the Tasmota device topic, if set.
    #[must_use]
    pub fn device_topic(&self) -> Option<&str> {
        self.mqtt_topic.as_deref()
    }

    /// Returns the shutter index (default `"1"`).
    #[must_use]
    pub fn shutter_index(&self) -> &str {
        &self.mqtt_shutter_index
    }

    /// Returns the result topic override.
    #[must_use]
    pub fn result_topic_override(&self) -> Option<&str> {
        self.mqtt_result_topic.as_deref()
    }

    /// Returns the command topic override.
    #[must_use]
    pub fn command_topic_override(&self) -> Option<&str> {
        self.mqtt_command_topic.as_deref()
    }

    /// Returns the telemetry topic override.
    #[must_use]
    pub fn tele_topic_override(&self) -> Option<&str> {
        self.mqtt_tele_topic.as_deref()
    }

    /// Returns the shutter name override.
    #[must_use]
    pub fn shutter_name_override(&self) -> Option<&str> {
        self.mqtt_shutter_name.as_deref()
    }

    /// Returns the static accessory information.
    #[must_use]
    pub fn information(&self) -> AccessoryInformation {
        AccessoryInformation {
            name: self.name.clone(),
            manufacturer: self.manufacturer.clone(),
            model: self.model.clone(),
            serial_number: self.serial_number_mac.clone(),
        }
    }

    /// Returns the MQTT session settings derived from this configuration.
    #[must_use]
    pub fn mqtt_settings(&self) -> MqttSettings {
        let mut settings = MqttSettings::default();
        if let Some(username) = &self.mqtt_username {
            settings.credentials = Some((
                username.clone(),
                self.mqtt_password.clone().unwrap_or_default(),
            ));
        }
        settings.last_will.clone_from(&self.mqtt_last_will);
        settings
    }
}

/// MQTT session settings.
///
/// The defaults favour quick detection of a lost broker: a 10 second
/// keep-alive and a 1 second pause before reconnecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    /// Client identifier presented to the broker.
    pub client_id: String,
    /// Keep-alive interval.
    pub keep_alive: Duration,
    /// Whether to start a clean session on every connect.
    pub clean_session: bool,
    /// Pause between a connection error and the next attempt.
    pub reconnect_interval: Duration,
    /// Time allowed for the TCP and MQTT handshake.
    pub connect_timeout: Duration,
    /// Username and password for the broker.
    pub credentials: Option<(String, String)>,
    /// Optional last-will message.
    pub last_will: Option<LastWillConfig>,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            client_id: generate_client_id(),
            keep_alive: Duration::from_secs(10),
            clean_session: true,
            reconnect_interval: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(30),
            credentials: None,
            last_will: None,
        }
    }
}

/// Generates a random client identifier such as `tasmota_blinds_1a2b3c4d`.
fn generate_client_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("tasmota_blinds_{}", &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "name": "Office blinds",
        "mqttBrokerUrl": "mqtt://broker:1883",
        "mqttTopic": "Office"
    }"#;

    #[test]
    fn minimal_config_defaults() {
        let config = AccessoryConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.name(), "Office blinds");
        assert_eq!(config.shutter_index(), "1");
        assert_eq!(config.device_topic(), Some("Office"));
        assert!(config.model().is_empty());
        assert!(config.serial_number().is_empty());
        assert!(config.result_topic_override().is_none());
    }

    #[test]
    fn shutter_index_accepts_number() {
        let json = r#"{"name":"n","mqttBrokerUrl":"b","mqttTopic":"t","mqttShutterIndex":2}"#;
        let config = AccessoryConfig::from_json(json).unwrap();
        assert_eq!(config.shutter_index(), "2");
    }

    #[test]
    fn information_uses_static_strings() {
        let json = r#"{"name":"n","manufacturer":"Acme","model":"S1","serialNumberMAC":"AA:BB","mqttBrokerUrl":"b","mqttTopic":"t"}"#;
        let info = AccessoryConfig::from_json(json).unwrap().information();
        assert_eq!(info.name, "n");
        assert_eq!(info.manufacturer, "Acme");
        assert_eq!(info.model, "S1");
        assert_eq!(info.serial_number, "AA:BB");
    }

    #[test]
    fn missing_broker_url_is_rejected() {
        let result = AccessoryConfig::from_json(r#"{"name":"n","mqttTopic":"t"}"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));

        let result = AccessoryConfig::from_json(r#"{"name":"n","mqttBrokerUrl":" ","mqttTopic":"t"}"#);
        assert!(matches!(
            result,
            Err(ConfigError::MissingField("mqttBrokerUrl"))
        ));
    }

    #[test]
    fn topic_required_unless_all_overridden() {
        let result = AccessoryConfig::from_json(r#"{"name":"n","mqttBrokerUrl":"b"}"#);
        assert!(matches!(result, Err(ConfigError::MissingField("mqttTopic"))));

        let json = r#"{"name":"n","mqttBrokerUrl":"b","mqttResultTopic":"r","mqttCommandTopic":"c","mqttTeleTopic":"t"}"#;
        assert!(AccessoryConfig::from_json(json).is_ok());
    }

    #[test]
    fn settings_defaults() {
        let settings = AccessoryConfig::from_json(MINIMAL).unwrap().mqtt_settings();
        assert_eq!(settings.keep_alive, Duration::from_secs(10));
        assert_eq!(settings.reconnect_interval, Duration::from_secs(1));
        assert_eq!(settings.connect_timeout, Duration::from_secs(30));
        assert!(settings.clean_session);
        assert!(settings.credentials.is_none());
        assert!(settings.client_id.starts_with("tasmota_blinds_"));
        assert_eq!(settings.client_id.len(), "tasmota_blinds_".len() + 8);
    }

    #[test]
    fn settings_with_credentials_and_will() {
        let json = r#"{"name":"n","mqttBrokerUrl":"b","mqttTopic":"t",
            "mqttUsername":"user","mqttPassword":"pass",
            "mqttLastWill":{"topic":"bridge/status","payload":"offline","retain":true}}"#;
        let settings = AccessoryConfig::from_json(json).unwrap().mqtt_settings();
        assert_eq!(
            settings.credentials,
            Some(("user".to_string(), "pass".to_string()))
        );
        let will = settings.last_will.unwrap();
        assert_eq!(will.topic, "bridge/status");
        assert!(will.retain);
    }

    #[test]
    fn password_without_username_is_rejected() {
        let json = r#"{"name":"n","mqttBrokerUrl":"b","mqttTopic":"t","mqttPassword":"p"}"#;
        assert!(matches!(
            AccessoryConfig::from_json(json),
            Err(ConfigError::InvalidValue { key: "mqttPassword", .. })
        ));
    }

    #[test]
    fn client_ids_are_unique() {
        assert_ne!(generate_client_id(), generate_client_id());
    }
}
