// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing of Tasmota shutter reports.
//!
//! A shutter controller publishes the state of its shutters on two topics:
//!
//! - `stat/<topic>/RESULT` - the fields that changed, after a command or move
//! - `tele/<topic>/SENSOR` - a periodic snapshot of every shutter
//!
//! Both carry one JSON object per shutter keyed by its name:
//!
//! ```text
//! {"Time":"2020-09-12T13:55:32","Shutter1":{"Position":0,"Direction":0,"Target":0}}
//! {"Shutter2":{"Position":100,"Direction":0,"Target":100}}
//! ```

mod shutter_report;

pub use shutter_report::ShutterReport;
