// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT topic resolution for a single shutter.

use crate::config::AccessoryConfig;
use crate::error::ProtocolError;

use super::Transport;

/// The MQTT topics and JSON key used for one shutter.
///
/// Derived from the Tasmota device topic and shutter index, each value can
/// be overridden individually in the configuration:
///
/// - result: `stat/<topic>/RESULT`
/// - telemetry: `tele/<topic>/SENSOR`
/// - command: `cmnd/<topic>/ShutterPosition<index>`
/// - shutter name: `Shutter<index>`
///
/// # Examples
///
/// ```
/// use tasmota_blinds::protocol::ShutterTopics;
///
/// let topics = ShutterTopics::derive("Office", "1");
/// assert_eq!(topics.result(), "stat/Office/RESULT");
/// assert_eq!(topics.command(), "cmnd/Office/ShutterPosition1");
/// assert_eq!(topics.telemetry(), "tele/Office/SENSOR");
/// assert_eq!(topics.shutter_name(), "Shutter1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutterTopics {
    result: String,
    telemetry: String,
    command: String,
    shutter_name: String,
}

impl ShutterTopics {
    /// Derives all topics from a device topic and shutter index.
    #[must_use]
    pub fn derive(device_topic: &str, shutter_index: &str) -> Self {
        Self {
            result: format!("stat/{device_topic}/RESULT"),
            telemetry: format!("tele/{device_topic}/SENSOR"),
            command: format!("cmnd/{device_topic}/ShutterPosition{shutter_index}"),
            shutter_name: format!("Shutter{shutter_index}"),
        }
    }

    /// Resolves the topics for a configuration, honouring overrides.
    #[must_use]
    pub fn resolve(config: &AccessoryConfig) -> Self {
        let derived = Self::derive(
            config.device_topic().unwrap_or_default(),
            config.shutter_index(),
        );

        let pick = |over: Option<&str>, derived: String| over.map_or(derived, str::to_string);

        Self {
            result: pick(config.result_topic_override(), derived.result),
            telemetry: pick(config.tele_topic_override(), derived.telemetry),
            command: pick(config.command_topic_override(), derived.command),
            shutter_name: pick(config.shutter_name_override(), derived.shutter_name),
        }
    }

    /// Topic carrying command results (`stat/<topic>/RESULT`).
    #[must_use]
    pub fn result(&self) -> &str {
        &self.result
    }

    /// Topic carrying periodic sensor snapshots (`tele/<topic>/SENSOR`).
    #[must_use]
    pub fn telemetry(&self) -> &str {
        &self.telemetry
    }

    /// Topic receiving target position commands.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// JSON key of this shutter inside result and telemetry payloads.
    #[must_use]
    pub fn shutter_name(&self) -> &str {
        &self.shutter_name
    }

    /// Returns the topic filters to subscribe to.
    #[must_use]
    pub fn inbound(&self) -> [&str; 2] {
        [&self.result, &self.telemetry]
    }

    /// Returns `true` if messages on `topic` carry shutter reports.
    ///
    /// Overridden result or telemetry topics may be filters with `+` or `#`
    /// wildcards; a delivered topic counts as inbound when it matches one.
    #[must_use]
    pub fn is_inbound(&self, topic: &str) -> bool {
        self.inbound()
            .into_iter()
            .any(|filter| filter_matches(topic, filter))
    }

    /// Queues subscriptions to the result and telemetry topics.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport refuses a subscription.
    pub fn subscribe<T: Transport + ?Sized>(&self, transport: &T) -> Result<(), ProtocolError> {
        for filter in self.inbound() {
            transport.subscribe(filter)?;
        }
        Ok(())
    }
}

#[cfg(feature = "mqtt")]
fn filter_matches(topic: &str, filter: &str) -> bool {
    rumqttc::matches(topic, filter)
}

#[cfg(not(feature = "mqtt"))]
fn filter_matches(topic: &str, filter: &str) -> bool {
    topic == filter
}
