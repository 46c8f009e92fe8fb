// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shutter state management types.
//!
//! [`ShutterState`] holds the last known position, movement state and target
//! of a shutter. [`StateChange`] represents one field update decoded from a
//! device report.
//!
//! # Examples
//!
//! ```
//! use tasmota_blinds::state::{ShutterState, StateChange};
//! use tasmota_blinds::types::PositionState;
//!
//! let mut state = ShutterState::new();
//! state.apply(&StateChange::PositionState(PositionState::Increasing));
//!
//! assert_eq!(state.position_state(), PositionState::Increasing);
//! ```

mod shutter_state;
mod state_change;

pub use shutter_state::ShutterState;
pub use state_change::StateChange;
