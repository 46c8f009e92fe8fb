// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shutter position type.
//!
//! This module provides a type-safe representation of shutter positions,
//! ensuring values are always within the valid range of 0-100%.

use std::fmt;

use crate::error::ValueError;

/// Shutter opening as a percentage (0-100).
///
/// Tasmota reports 0 for a fully closed shutter and 100 for a fully open
/// one. The same scale is used by the window-covering characteristics.
///
/// # Examples
///
/// ```
/// use tasmota_blinds::types::Position;
///
/// let half = Position::new(50).unwrap();
/// assert_eq!(half.value(), 50);
///
/// assert_eq!(Position::CLOSED.value(), 0);
/// assert_eq!(Position::OPEN.value(), 100);
///
/// assert!(Position::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(u8);

impl Position {
    /// Fully closed (0%).
    pub const CLOSED: Self = Self(0);

    /// Fully open (100%).
    pub const OPEN: Self = Self(100);

    /// Creates a new position.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the value as the decimal string Tasmota expects as a
    /// `ShutterPosition` payload.
    #[must_use]
    pub fn to_payload(&self) -> String {
        self.0.to_string()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::OPEN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Position {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Position {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(v) if v <= 100 => Ok(Self(v)),
            _ => Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: value,
            }),
        }
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        position.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_bounds() {
        assert_eq!(Position::new(0).unwrap(), Position::CLOSED);
        assert_eq!(Position::new(100).unwrap(), Position::OPEN);
        assert!(Position::new(101).is_err());
    }

    #[test]
    fn position_from_i64() {
        assert_eq!(Position::try_from(42_i64).unwrap().value(), 42);
        assert_eq!(
            Position::try_from(-1_i64),
            Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: -1
            })
        );
        assert!(Position::try_from(300_i64).is_err());
    }

    #[test]
    fn position_defaults_to_open() {
        assert_eq!(Position::default(), Position::OPEN);
    }

    #[test]
    fn position_payload_and_display() {
        let pos = Position::new(75).unwrap();
        assert_eq!(pos.to_payload(), "75");
        assert_eq!(pos.to_string(), "75%");
    }
}
