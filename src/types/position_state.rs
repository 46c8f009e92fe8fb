// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Movement state of a shutter.

use std::fmt;

use crate::error::ValueError;

/// Movement state as exposed by the window-covering `PositionState`
/// characteristic.
///
/// Tasmota reports movement as a `Direction` code (-1 closing, 1 opening,
/// 0 idle) which maps onto these variants.
///
/// # Examples
///
/// ```
/// use tasmota_blinds::types::PositionState;
///
/// let state = PositionState::from_direction(-1).unwrap();
/// assert_eq!(state, PositionState::Decreasing);
/// assert_eq!(state.as_num(), 0);
///
/// assert!(PositionState::from_direction(5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionState {
    /// The shutter is closing.
    Decreasing,
    /// The shutter is opening.
    Increasing,
    /// The shutter is not moving.
    #[default]
    Stopped,
}

impl PositionState {
    /// Maps a Tasmota `Direction` code onto a position state.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidDirection` for codes other than -1, 0, 1.
    pub const fn from_direction(direction: i64) -> Result<Self, ValueError> {
        match direction {
            -1 => Ok(Self::Decreasing),
            1 => Ok(Self::Increasing),
            0 => Ok(Self::Stopped),
            other => Err(ValueError::InvalidDirection(other)),
        }
    }

    /// Returns the characteristic value (0, 1 or 2).
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Decreasing => 0,
            Self::Increasing => 1,
            Self::Stopped => 2,
        }
    }

    /// Returns a lowercase name for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Decreasing => "decreasing",
            Self::Increasing => "increasing",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PositionState> for u8 {
    fn from(state: PositionState) -> Self {
        state.as_num()
    }
}
