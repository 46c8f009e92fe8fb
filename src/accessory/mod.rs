// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Window-covering accessory exposed to the smart-home host.
//!
//! The host owns the accessory protocol. This crate only needs three things
//! from it, expressed as traits so that nothing depends on process-wide
//! host handles:
//!
//! - an [`AccessoryFactory`] that builds the host's window-covering service
//! - a [`WindowCoveringService`] to push characteristic values
//! - somewhere to register the [`CharacteristicHandlers`] for get/set
//!
//! [`ShutterAccessory`] ties these to a Tasmota shutter.

mod handlers;
mod shutter;

pub use handlers::{CharacteristicHandlers, GetHandler, SetHandler};
pub use shutter::ShutterAccessory;

use std::fmt;

/// Characteristics of the window-covering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    /// Current opening, 0-100. Read-only.
    CurrentPosition,
    /// Movement state, 0 decreasing, 1 increasing, 2 stopped. Read-only.
    PositionState,
    /// Requested opening, 0-100. Read/write.
    TargetPosition,
}

impl Characteristic {
    /// All characteristics of the service.
    pub const ALL: [Self; 3] = [
        Self::CurrentPosition,
        Self::PositionState,
        Self::TargetPosition,
    ];

    /// Returns the characteristic name as the host knows it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentPosition => "CurrentPosition",
            Self::PositionState => "PositionState",
            Self::TargetPosition => "TargetPosition",
        }
    }

    /// Returns `true` if the host may write this characteristic.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        matches!(self, Self::TargetPosition)
    }

    /// Returns the inclusive range of valid values.
    #[must_use]
    pub const fn range(&self) -> (u8, u8) {
        match self {
            Self::CurrentPosition | Self::TargetPosition => (0, 100),
            Self::PositionState => (0, 2),
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static accessory information service contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessoryInformation {
    /// Display name.
    pub name: String,
    /// Manufacturer.
    pub manufacturer: String,
    /// Model.
    pub model: String,
    /// Serial number (usually the device MAC address).
    pub serial_number: String,
}

/// The host's window-covering service.
///
/// Implementations must accept updates at any time, outside of any get/set
/// exchange, and from any thread.
pub trait WindowCoveringService: Send + Sync {
    /// Pushes a new value for `characteristic` to the host.
    fn update_value(&self, characteristic: Characteristic, value: u8);
}

impl<S: WindowCoveringService + ?Sized> WindowCoveringService for std::sync::Arc<S> {
    fn update_value(&self, characteristic: Characteristic, value: u8) {
        (**self).update_value(characteristic, value);
    }
}

/// Builds host services for a new accessory.
pub trait AccessoryFactory {
    /// The service type produced.
    type Service: WindowCoveringService;

    /// Creates the window-covering service for an accessory named `name`.
    fn window_covering(&self, name: &str) -> Self::Service;
}
