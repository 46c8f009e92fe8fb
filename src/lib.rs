// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tasmota Blinds - expose Tasmota shutters as window-covering accessories.
//!
//! A Tasmota shutter controller reports each shutter's position, direction
//! and target over MQTT. This crate keeps a cached copy of that state,
//! pushes every update to the host's window-covering service, and turns
//! host "set target position" requests into `ShutterPosition` commands.
//!
//! # Topics
//!
//! For device topic `Office` and shutter index `1`:
//!
//! - `stat/Office/RESULT` - partial reports after commands and moves
//! - `tele/Office/SENSOR` - periodic full snapshots
//! - `cmnd/Office/ShutterPosition1` - target position commands
//!
//! # Quick Start
//!
//! ```no_run
//! use tasmota_blinds::accessory::{AccessoryFactory, Characteristic, WindowCoveringService};
//! use tasmota_blinds::{AccessoryConfig, ShutterBridge};
//!
//! struct Service;
//! impl WindowCoveringService for Service {
//!     fn update_value(&self, characteristic: Characteristic, value: u8) {
//!         println!("{characteristic} is now {value}");
//!     }
//! }
//!
//! struct Host;
//! impl AccessoryFactory for Host {
//!     type Service = Service;
//!     fn window_covering(&self, _name: &str) -> Service {
//!         Service
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> tasmota_blinds::Result<()> {
//!     let config = AccessoryConfig::from_json(r#"{
//!         "name": "Office blinds",
//!         "mqttBrokerUrl": "mqtt://192.168.1.50:1883",
//!         "mqttTopic": "Office"
//!     }"#)?;
//!
//!     let bridge = ShutterBridge::connect(&config, &Host)?;
//!     bridge.handlers().set(Characteristic::TargetPosition, 75)?;
//!     Ok(())
//! }
//! ```
//!
//! # Without a broker
//!
//! [`ShutterAccessory`] only needs a [`Transport`](protocol::Transport), so
//! it can be driven directly, for instance from another MQTT stack.

pub mod accessory;
#[cfg(feature = "mqtt")]
pub mod bridge;
pub mod config;
pub mod error;
pub mod protocol;
pub mod state;
pub mod telemetry;
pub mod types;

pub use accessory::{
    AccessoryFactory, AccessoryInformation, Characteristic, CharacteristicHandlers,
    ShutterAccessory, WindowCoveringService,
};
#[cfg(feature = "mqtt")]
pub use bridge::ShutterBridge;
pub use config::{AccessoryConfig, MqttSettings};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result, ValueError};
pub use protocol::{ShutterTopics, Transport};
pub use state::{ShutterState, StateChange};
pub use types::{Position, PositionState};
