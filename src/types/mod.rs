// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for shutter control.
//!
//! Each type ensures values are within their valid ranges at construction
//! time, so an invalid value never reaches the accessory host.
//!
//! # Types
//!
//! - [`Position`] - Shutter opening (0-100%)
//! - [`PositionState`] - Movement state (decreasing, increasing, stopped)

mod position;
mod position_state;

pub use position::Position;
pub use position_state::PositionState;
