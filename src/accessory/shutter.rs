// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shutter accessory: keeps a Tasmota shutter and a window-covering service
//! in sync.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::AccessoryConfig;
use crate::error::{ParseError, ProtocolError};
use crate::protocol::{ShutterTopics, Transport};
use crate::state::{ShutterState, StateChange};
use crate::telemetry::ShutterReport;
use crate::types::{Position, PositionState};

use super::{
    AccessoryFactory, AccessoryInformation, Characteristic, CharacteristicHandlers,
    WindowCoveringService,
};

/// A Tasmota shutter exposed as a window-covering accessory.
///
/// Device reports go in through [`handle_message`](Self::handle_message);
/// host requests come in through the getters and
/// [`set_target_position`](Self::set_target_position), or through the map
/// returned by [`handlers`](Self::handlers).
///
/// The cached [`ShutterState`] is only written by `handle_message`. Reads
/// never touch the network and succeed before any report has arrived.
///
/// # Examples
///
/// ```
/// use tasmota_blinds::accessory::{AccessoryInformation, Characteristic, ShutterAccessory,
///     WindowCoveringService};
/// use tasmota_blinds::error::ProtocolError;
/// use tasmota_blinds::protocol::{ShutterTopics, Transport};
///
/// struct Discard;
/// impl Transport for Discard {
///     fn publish(&self, _: &str, _: &str) -> Result<(), ProtocolError> { Ok(()) }
///     fn subscribe(&self, _: &str) -> Result<(), ProtocolError> { Ok(()) }
/// }
/// impl WindowCoveringService for Discard {
///     fn update_value(&self, _: Characteristic, _: u8) {}
/// }
///
/// let accessory = ShutterAccessory::with_parts(
///     ShutterTopics::derive("Office", "1"),
///     AccessoryInformation::default(),
///     Discard,
///     Discard,
/// );
///
/// accessory.handle_message(br#"{"Shutter1":{"Position":42}}"#).unwrap();
/// assert_eq!(accessory.current_position().value(), 42);
/// ```
pub struct ShutterAccessory<T, S> {
    topics: ShutterTopics,
    information: AccessoryInformation,
    state: RwLock<ShutterState>,
    /// Serializes report handling so pushes reach the host in write order.
    updates: Mutex<()>,
    transport: T,
    service: S,
}

impl<T, S> ShutterAccessory<T, S>
where
    T: Transport,
    S: WindowCoveringService,
{
    /// Creates an accessory from its configuration.
    ///
    /// The host service is built through `factory`. An empty command is
    /// published right away so the device reports its current state.
    pub fn new<F>(config: &AccessoryConfig, transport: T, factory: &F) -> Self
    where
        F: AccessoryFactory<Service = S>,
    {
        let service = factory.window_covering(config.name());
        Self::with_parts(
            ShutterTopics::resolve(config),
            config.information(),
            transport,
            service,
        )
    }

    /// Creates an accessory from already resolved parts.
    ///
    /// Like [`new`](Self::new), this requests the device state once. A failed
    /// request is logged and does not prevent construction.
    pub fn with_parts(
        topics: ShutterTopics,
        information: AccessoryInformation,
        transport: T,
        service: S,
    ) -> Self {
        let accessory = Self {
            topics,
            information,
            state: RwLock::new(ShutterState::new()),
            updates: Mutex::new(()),
            transport,
            service,
        };

        if let Err(e) = accessory.request_state() {
            tracing::warn!(
                topic = %accessory.topics.command(),
                error = %e,
                "Failed to request initial shutter state"
            );
        }

        accessory
    }

    /// Returns the resolved topics.
    #[must_use]
    pub fn topics(&self) -> &ShutterTopics {
        &self.topics
    }

    /// Returns the accessory information service contents.
    #[must_use]
    pub fn information(&self) -> &AccessoryInformation {
        &self.information
    }

    /// Returns the outbound transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the host window-covering service.
    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns a snapshot of the cached state.
    #[must_use]
    pub fn state(&self) -> ShutterState {
        *self.state.read()
    }

    /// Returns the cached current position.
    #[must_use]
    pub fn current_position(&self) -> Position {
        let position = self.state.read().current_position();
        tracing::debug!(shutter = %self.topics.shutter_name(), %position, "Requested CurrentPosition");
        position
    }

    /// Returns the cached movement state.
    #[must_use]
    pub fn position_state(&self) -> PositionState {
        let state = self.state.read().position_state();
        tracing::debug!(shutter = %self.topics.shutter_name(), %state, "Requested PositionState");
        state
    }

    /// Returns the cached target position.
    #[must_use]
    pub fn target_position(&self) -> Position {
        let position = self.state.read().target_position();
        tracing::debug!(shutter = %self.topics.shutter_name(), %position, "Requested TargetPosition");
        position
    }

    /// Applies a payload received on the result or telemetry topic.
    ///
    /// Each recognised field updates its slice of the state and is pushed to
    /// the matching characteristic. Returns the applied changes; an empty
    /// list means the payload did not mention this shutter or carried no
    /// usable field.
    ///
    /// Concurrent calls are handled one at a time, so the last value pushed
    /// for a characteristic is always the cached one. The state lock itself
    /// is released before the host is notified; the service must not call
    /// back into `handle_message`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is not a JSON object or the
    /// shutter entry is malformed. The state is left untouched.
    pub fn handle_message(&self, payload: &[u8]) -> Result<Vec<StateChange>, ParseError> {
        let Some(report) = ShutterReport::from_payload(payload, self.topics.shutter_name())?
        else {
            return Ok(Vec::new());
        };

        let changes = report.to_state_changes();
        let _updates = self.updates.lock();

        {
            let mut state = self.state.write();
            for change in &changes {
                state.apply(change);
            }
        }

        for change in &changes {
            let characteristic = change.characteristic();
            let value = change.value();
            self.service.update_value(characteristic, value);
            tracing::debug!(
                shutter = %self.topics.shutter_name(),
                %characteristic,
                value,
                "Updated characteristic"
            );
        }

        Ok(changes)
    }

    /// Commands the shutter to move to `position`.
    ///
    /// The command is queued and the call returns immediately; the device
    /// confirms through a later report. The cached target is not touched.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` only if the transport refuses to queue the
    /// message.
    pub fn set_target_position(&self, position: Position) -> Result<(), ProtocolError> {
        tracing::debug!(shutter = %self.topics.shutter_name(), %position, "Set TargetPosition");
        self.transport
            .publish(self.topics.command(), &position.to_payload())
    }

    /// Publishes an empty command, which makes Tasmota report the shutter
    /// state on the result topic.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport refuses to queue the message.
    pub fn request_state(&self) -> Result<(), ProtocolError> {
        self.transport.publish(self.topics.command(), "")
    }
}

impl<T, S> ShutterAccessory<T, S>
where
    T: Transport + 'static,
    S: WindowCoveringService + 'static,
{
    /// Builds the get/set handler map for the host.
    ///
    /// All three characteristics get a read handler; `TargetPosition` also
    /// gets a write handler that publishes the new target.
    #[must_use]
    pub fn handlers(self: &Arc<Self>) -> CharacteristicHandlers {
        let current = Arc::clone(self);
        let state = Arc::clone(self);
        let target = Arc::clone(self);
        let setter = Arc::clone(self);

        CharacteristicHandlers::new()
            .with_get(Characteristic::CurrentPosition, move || {
                current.current_position().value()
            })
            .with_get(Characteristic::PositionState, move || {
                state.position_state().as_num()
            })
            .with_get(Characteristic::TargetPosition, move || {
                target.target_position().value()
            })
            .with_set(Characteristic::TargetPosition, move |value| {
                let position = Position::new(value)?;
                setter.set_target_position(position)?;
                Ok(())
            })
    }
}

impl<T, S> std::fmt::Debug for ShutterAccessory<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutterAccessory")
            .field("topics", &self.topics)
            .field("information", &self.information)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}
