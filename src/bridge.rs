// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connects a [`ShutterAccessory`] to an MQTT broker.
//!
//! # Examples
//!
//! ```no_run
//! use tasmota_blinds::accessory::{AccessoryFactory, Characteristic, WindowCoveringService};
//! use tasmota_blinds::bridge::ShutterBridge;
//! use tasmota_blinds::config::AccessoryConfig;
//!
//! struct HostService;
//! impl WindowCoveringService for HostService {
//!     fn update_value(&self, characteristic: Characteristic, value: u8) {
//!         println!("{characteristic} = {value}");
//!     }
//! }
//!
//! struct Host;
//! impl AccessoryFactory for Host {
//!     type Service = HostService;
//!     fn window_covering(&self, _name: &str) -> HostService {
//!         HostService
//!     }
//! }
//!
//! # async fn example() -> tasmota_blinds::Result<()> {
//! let config = AccessoryConfig::from_json(r#"{
//!     "name": "Office blinds",
//!     "mqttBrokerUrl": "mqtt://192.168.1.50:1883",
//!     "mqttTopic": "Office"
//! }"#)?;
//!
//! let bridge = ShutterBridge::connect(&config, &Host)?;
//! let handlers = bridge.handlers();
//! handlers.set(Characteristic::TargetPosition, 50)?;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Weak};
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, NetworkOptions, Packet};
use tokio::task::JoinHandle;

use crate::accessory::{
    AccessoryFactory, CharacteristicHandlers, ShutterAccessory, WindowCoveringService,
};
use crate::config::AccessoryConfig;
use crate::error::{ProtocolError, Result};
use crate::protocol::{MqttTransport, ShutterTopics, Transport, mqtt_options};

/// Capacity of the request queue between the client and its event loop.
const REQUEST_CAPACITY: usize = 10;

/// A shutter accessory attached to a live MQTT connection.
///
/// Dropping the bridge stops its event loop.
pub struct ShutterBridge<S> {
    accessory: Arc<ShutterAccessory<MqttTransport, S>>,
    task: JoinHandle<()>,
}

impl<S> ShutterBridge<S>
where
    S: WindowCoveringService + 'static,
{
    /// Creates the accessory and starts its MQTT session.
    ///
    /// Subscriptions to the result and telemetry topics are queued before the
    /// initial state request, so the device's answer is not missed. The call
    /// does not wait for the broker: connection problems are logged and
    /// retried by the event loop.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, the broker URL cannot
    /// be parsed, or no Tokio runtime is running.
    pub fn connect<F>(config: &AccessoryConfig, factory: &F) -> Result<Self>
    where
        F: AccessoryFactory<Service = S>,
    {
        config.validate()?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ProtocolError::Runtime(e.to_string()))?;

        let settings = config.mqtt_settings();
        let options = mqtt_options(config.broker_url(), &settings)?;
        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);

        let mut network = NetworkOptions::new();
        network.set_connection_timeout(settings.connect_timeout.as_secs());
        event_loop.set_network_options(network);

        let transport = MqttTransport::new(client);
        ShutterTopics::resolve(config).subscribe(&transport)?;

        let accessory = Arc::new(ShutterAccessory::new(config, transport, factory));

        tracing::info!(
            name = %config.name(),
            broker = %config.broker_url(),
            client_id = %settings.client_id,
            shutter = %accessory.topics().shutter_name(),
            "Starting shutter bridge"
        );

        let task = runtime.spawn(handle_mqtt_events(
            event_loop,
            Arc::downgrade(&accessory),
            settings.reconnect_interval,
        ));

        Ok(Self { accessory, task })
    }

    /// Returns the bridged accessory.
    #[must_use]
    pub fn accessory(&self) -> &Arc<ShutterAccessory<MqttTransport, S>> {
        &self.accessory
    }

    /// Returns the get/set handlers to register with the host.
    #[must_use]
    pub fn handlers(&self) -> CharacteristicHandlers {
        self.accessory.handlers()
    }

    /// Returns `true` while the event loop task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl<S> Drop for ShutterBridge<S> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<S> std::fmt::Debug for ShutterBridge<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutterBridge")
            .field("accessory", &self.accessory)
            .finish_non_exhaustive()
    }
}

/// Drives the MQTT event loop and feeds shutter reports to the accessory.
///
/// `rumqttc` reconnects on the next poll after an error, so errors are only
/// logged and followed by a pause. The loop ends once the accessory is
/// dropped or the client's request channel closes.
async fn handle_mqtt_events<S>(
    mut event_loop: EventLoop,
    accessory: Weak<ShutterAccessory<MqttTransport, S>>,
    reconnect_interval: Duration,
) where
    S: WindowCoveringService,
{
    let mut connected_before = false;

    loop {
        let event = event_loop.poll().await;

        let Some(accessory) = accessory.upgrade() else {
            tracing::debug!("Shutter accessory dropped, stopping MQTT event loop");
            break;
        };

        match event {
            Ok(event) => dispatch(&accessory, &event, &mut connected_before),
            Err(ConnectionError::RequestsDone) => {
                tracing::debug!("MQTT client dropped, stopping event loop");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error event on MQTT");
                drop(accessory);
                tokio::time::sleep(reconnect_interval).await;
            }
        }
    }
}

/// Handles one event from the MQTT event loop.
///
/// Publishes on the result or telemetry topic go to
/// [`ShutterAccessory::handle_message`]; malformed reports are logged and
/// dropped. A ConnAck after the first one without a stored session renews
/// the subscriptions and requests the state again.
fn dispatch<T, S>(accessory: &ShutterAccessory<T, S>, event: &Event, connected_before: &mut bool)
where
    T: Transport,
    S: WindowCoveringService,
{
    match event {
        Event::Incoming(Packet::ConnAck(connack)) => {
            tracing::info!(?connack, "MQTT is running");
            if *connected_before && !connack.session_present {
                resubscribe(accessory);
            }
            *connected_before = true;
        }
        Event::Incoming(Packet::SubAck(suback)) => {
            tracing::debug!(?suback, "MQTT subscription acknowledged");
        }
        Event::Incoming(Packet::Publish(publish)) => {
            if !accessory.topics().is_inbound(&publish.topic) {
                tracing::trace!(topic = %publish.topic, "Ignoring message on unrelated topic");
                return;
            }
            if let Err(e) = accessory.handle_message(&publish.payload) {
                tracing::warn!(
                    topic = %publish.topic,
                    error = %e,
                    "Ignoring malformed shutter report"
                );
            }
        }
        _ => {}
    }
}

fn resubscribe<T, S>(accessory: &ShutterAccessory<T, S>)
where
    T: Transport,
    S: WindowCoveringService,
{
    if let Err(e) = accessory.topics().subscribe(accessory.transport()) {
        tracing::warn!(error = %e, "Failed to renew shutter subscriptions");
    }
    if let Err(e) = accessory.request_state() {
        tracing::warn!(error = %e, "Failed to request shutter state after reconnect");
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use rumqttc::{ConnAck, ConnectReturnCode, MqttOptions, Publish, QoS};

    use super::*;
    use crate::accessory::{AccessoryInformation, Characteristic};
    use crate::types::Position;

    struct NullService;

    impl WindowCoveringService for NullService {
        fn update_value(&self, _: Characteristic, _: u8) {}
    }

    struct NullHost;

    impl AccessoryFactory for NullHost {
        type Service = NullService;

        fn window_covering(&self, _name: &str) -> NullService {
            NullService
        }
    }

    fn config(url: &str) -> AccessoryConfig {
        AccessoryConfig::from_value(serde_json::json!({
            "name": "Office blinds",
            "mqttBrokerUrl": url,
            "mqttTopic": "Office",
        }))
        .unwrap()
    }

    #[test]
    fn connect_requires_runtime() {
        let result = ShutterBridge::connect(&config("mqtt://127.0.0.1:1"), &NullHost);
        assert!(matches!(
            result,
            Err(crate::Error::Protocol(ProtocolError::Runtime(_)))
        ));
    }

    #[tokio::test]
    async fn connect_rejects_bad_url() {
        let result = ShutterBridge::connect(&config("mqtt://broker:notaport"), &NullHost);
        assert!(matches!(
            result,
            Err(crate::Error::Protocol(ProtocolError::InvalidAddress(_)))
        ));
    }

    #[tokio::test]
    async fn connect_without_broker_still_serves_defaults() {
        let bridge = ShutterBridge::connect(&config("mqtt://127.0.0.1:1"), &NullHost).unwrap();
        let handlers = bridge.handlers();

        assert_eq!(handlers.get(Characteristic::CurrentPosition), Some(100));
        assert_eq!(handlers.get(Characteristic::PositionState), Some(2));
        assert_eq!(handlers.get(Characteristic::TargetPosition), Some(100));
        assert!(bridge.is_running());
    }

    #[derive(Default)]
    struct RecordingTransport {
        published: Mutex<Vec<(String, String)>>,
        subscribed: Mutex<Vec<String>>,
    }

    impl Transport for RecordingTransport {
        fn publish(&self, topic: &str, payload: &str) -> std::result::Result<(), ProtocolError> {
            self.published
                .lock()
                .push((topic.to_string(), payload.to_string()));
            Ok(())
        }

        fn subscribe(&self, filter: &str) -> std::result::Result<(), ProtocolError> {
            self.subscribed.lock().push(filter.to_string());
            Ok(())
        }
    }

    type RecordedAccessory = ShutterAccessory<Arc<RecordingTransport>, NullService>;

    fn recorded_accessory() -> (RecordedAccessory, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let accessory = ShutterAccessory::with_parts(
            ShutterTopics::derive("Office", "1"),
            AccessoryInformation::default(),
            Arc::clone(&transport),
            NullService,
        );
        (accessory, transport)
    }

    fn connack(session_present: bool) -> Event {
        Event::Incoming(Packet::ConnAck(ConnAck {
            session_present,
            code: ConnectReturnCode::Success,
        }))
    }

    fn publish(topic: &str, payload: &str) -> Event {
        Event::Incoming(Packet::Publish(Publish::new(
            topic,
            QoS::AtLeastOnce,
            payload.as_bytes().to_vec(),
        )))
    }

    #[test]
    fn dispatch_applies_inbound_reports() {
        let (accessory, _) = recorded_accessory();
        let mut connected = true;

        dispatch(
            &accessory,
            &publish("stat/Office/RESULT", r#"{"Shutter1":{"Position":40,"Direction":1}}"#),
            &mut connected,
        );
        dispatch(
            &accessory,
            &publish("tele/Office/SENSOR", r#"{"Shutter1":{"Target":10}}"#),
            &mut connected,
        );

        let state = accessory.state();
        assert_eq!(state.current_position().value(), 40);
        assert_eq!(state.position_state().as_num(), 1);
        assert_eq!(state.target_position().value(), 10);
    }

    #[test]
    fn dispatch_ignores_unrelated_topics() {
        let (accessory, _) = recorded_accessory();
        let mut connected = true;

        dispatch(
            &accessory,
            &publish("stat/Kitchen/RESULT", r#"{"Shutter1":{"Position":5}}"#),
            &mut connected,
        );
        dispatch(
            &accessory,
            &publish("cmnd/Office/ShutterPosition1", r#"{"Shutter1":{"Position":5}}"#),
            &mut connected,
        );

        assert_eq!(accessory.current_position(), Position::OPEN);
    }

    #[test]
    fn dispatch_survives_malformed_reports() {
        let (accessory, _) = recorded_accessory();
        let mut connected = true;

        dispatch(&accessory, &publish("stat/Office/RESULT", "not json"), &mut connected);
        dispatch(&accessory, &publish("stat/Office/RESULT", "[1,2]"), &mut connected);
        dispatch(
            &accessory,
            &publish("stat/Office/RESULT", r#"{"Shutter1":{"Position":60}}"#),
            &mut connected,
        );

        assert_eq!(accessory.current_position().value(), 60);
    }

    #[test]
    fn first_connack_does_not_resubscribe() {
        let (accessory, transport) = recorded_accessory();
        let mut connected = false;

        dispatch(&accessory, &connack(false), &mut connected);

        assert!(connected);
        assert!(transport.subscribed.lock().is_empty());
        assert_eq!(transport.published.lock().len(), 1);
    }

    #[test]
    fn reconnect_without_session_resubscribes_and_requests_state() {
        let (accessory, transport) = recorded_accessory();
        let mut connected = false;

        dispatch(&accessory, &connack(false), &mut connected);
        dispatch(&accessory, &connack(false), &mut connected);

        assert_eq!(
            *transport.subscribed.lock(),
            vec!["stat/Office/RESULT".to_string(), "tele/Office/SENSOR".to_string()]
        );
        assert_eq!(
            *transport.published.lock(),
            vec![
                ("cmnd/Office/ShutterPosition1".to_string(), String::new()),
                ("cmnd/Office/ShutterPosition1".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn reconnect_with_stored_session_keeps_subscriptions() {
        let (accessory, transport) = recorded_accessory();
        let mut connected = false;

        dispatch(&accessory, &connack(false), &mut connected);
        dispatch(&accessory, &connack(true), &mut connected);

        assert!(transport.subscribed.lock().is_empty());
        assert_eq!(transport.published.lock().len(), 1);
    }

    #[tokio::test]
    async fn event_loop_stops_once_accessory_is_gone() {
        let options = MqttOptions::new("blinds_event_loop_test", "127.0.0.1", 1);
        let (_client, event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let accessory = Weak::<ShutterAccessory<MqttTransport, NullService>>::new();

        let stopped = tokio::time::timeout(
            Duration::from_secs(10),
            handle_mqtt_events(event_loop, accessory, Duration::from_millis(10)),
        )
        .await;

        assert!(stopped.is_ok());
    }
}
