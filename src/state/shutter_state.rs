// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached state of a single shutter.

use crate::types::{Position, PositionState};

use super::StateChange;

/// Last known state of a shutter.
///
/// A fresh state describes an open, idle shutter: position 100, stopped,
/// target 100. It only changes through [`ShutterState::apply`].
///
/// # Examples
///
/// ```
/// use tasmota_blinds::state::{ShutterState, StateChange};
/// use tasmota_blinds::types::{Position, PositionState};
///
/// let mut state = ShutterState::new();
/// assert_eq!(state.current_position(), Position::OPEN);
/// assert_eq!(state.position_state(), PositionState::Stopped);
///
/// let changed = state.apply(&StateChange::CurrentPosition(Position::new(42).unwrap()));
/// assert!(changed);
/// assert_eq!(state.current_position().value(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutterState {
    current_position: Position,
    position_state: PositionState,
    target_position: Position,
}

impl ShutterState {
    /// Creates the default state (open and stopped).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current position.
    #[must_use]
    pub fn current_position(&self) -> Position {
        self.current_position
    }

    /// Returns the movement state.
    #[must_use]
    pub fn position_state(&self) -> PositionState {
        self.position_state
    }

    /// Returns the target position.
    #[must_use]
    pub fn target_position(&self) -> Position {
        self.target_position
    }

    /// Applies a change and returns `true` if the stored value differed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match *change {
            StateChange::CurrentPosition(p) => replace(&mut self.current_position, p),
            StateChange::PositionState(s) => replace(&mut self.position_state, s),
            StateChange::TargetPosition(p) => replace(&mut self.target_position, p),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
