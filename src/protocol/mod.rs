// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol plumbing between a shutter accessory and its Tasmota device.
//!
//! - [`ShutterTopics`]: the MQTT topics a shutter is reached through
//! - [`Transport`]: fire-and-forget publishing and subscribing,
//!   implemented by [`MqttTransport`] over `rumqttc`

#[cfg(feature = "mqtt")]
mod mqtt;
mod topics;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttTransport, mqtt_options, parse_mqtt_url};
pub use topics::ShutterTopics;

use crate::error::ProtocolError;

/// Outbound side of a device connection.
///
/// Publishing and subscribing only queue a request; implementations must
/// not wait for the broker or the device. An error means the request was
/// not queued.
pub trait Transport: Send + Sync {
    /// Queues `payload` for publication on `topic`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport refuses the message.
    fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError>;

    /// Queues a subscription to the topic filter `filter`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport refuses the request.
    fn subscribe(&self, filter: &str) -> Result<(), ProtocolError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
        (**self).publish(topic, payload)
    }

    fn subscribe(&self, filter: &str) -> Result<(), ProtocolError> {
        (**self).subscribe(filter)
    }
}
