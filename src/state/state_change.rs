// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! Each field of a Tasmota shutter report becomes one [`StateChange`], so a
//! partial `stat/<topic>/RESULT` payload touches only the fields it carries.

use crate::accessory::Characteristic;
use crate::types::{Position, PositionState};

/// A single update to a [`ShutterState`](super::ShutterState).
///
/// # Examples
///
/// ```
/// use tasmota_blinds::state::StateChange;
/// use tasmota_blinds::types::Position;
///
/// let change = StateChange::CurrentPosition(Position::new(42).unwrap());
/// assert_eq!(change.value(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// The shutter reported its current position.
    CurrentPosition(Position),

    /// The shutter started or stopped moving.
    PositionState(PositionState),

    /// The shutter reported the position it is moving to.
    TargetPosition(Position),
}

impl StateChange {
    /// Returns the characteristic this change must be pushed to.
    #[must_use]
    pub const fn characteristic(&self) -> Characteristic {
        match self {
            Self::CurrentPosition(_) => Characteristic::CurrentPosition,
            Self::PositionState(_) => Characteristic::PositionState,
            Self::TargetPosition(_) => Characteristic::TargetPosition,
        }
    }

    /// Returns the characteristic value carried by this change.
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self {
            Self::CurrentPosition(p) | Self::TargetPosition(p) => p.value(),
            Self::PositionState(s) => s.as_num(),
        }
    }
}
