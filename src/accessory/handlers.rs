// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Get/set handler map registered with the accessory host.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, ValueError};

use super::Characteristic;

/// Handler answering a host "get" request.
pub type GetHandler = Arc<dyn Fn() -> u8 + Send + Sync>;

/// Handler applying a host "set" request.
pub type SetHandler = Arc<dyn Fn(u8) -> crate::Result<()> + Send + Sync>;

/// Named get/set handlers for the window-covering characteristics.
///
/// The host glue walks this map and binds each handler to the matching
/// characteristic slot. Handlers are cheap to clone.
///
/// # Examples
///
/// ```
/// use tasmota_blinds::accessory::{Characteristic, CharacteristicHandlers};
///
/// let handlers = CharacteristicHandlers::new()
///     .with_get(Characteristic::CurrentPosition, || 42);
///
/// assert_eq!(handlers.get(Characteristic::CurrentPosition), Some(42));
/// assert_eq!(handlers.get(Characteristic::TargetPosition), None);
/// ```
#[derive(Default, Clone)]
pub struct CharacteristicHandlers {
    getters: HashMap<Characteristic, GetHandler>,
    setters: HashMap<Characteristic, SetHandler>,
}

impl CharacteristicHandlers {
    /// Creates an empty handler map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the get handler for `characteristic`.
    #[must_use]
    pub fn with_get<F>(mut self, characteristic: Characteristic, handler: F) -> Self
    where
        F: Fn() -> u8 + Send + Sync + 'static,
    {
        self.getters.insert(characteristic, Arc::new(handler));
        self
    }

    /// Registers the set handler for `characteristic`.
    ///
    /// Handlers for read-only characteristics are stored but never called.
    #[must_use]
    pub fn with_set<F>(mut self, characteristic: Characteristic, handler: F) -> Self
    where
        F: Fn(u8) -> crate::Result<()> + Send + Sync + 'static,
    {
        self.setters.insert(characteristic, Arc::new(handler));
        self
    }

    /// Returns the get handler for `characteristic`, if any.
    #[must_use]
    pub fn getter(&self, characteristic: Characteristic) -> Option<GetHandler> {
        self.getters.get(&characteristic).cloned()
    }

    /// Returns the set handler for `characteristic`, if any.
    #[must_use]
    pub fn setter(&self, characteristic: Characteristic) -> Option<SetHandler> {
        self.setters.get(&characteristic).cloned()
    }

    /// Answers a get request.
    #[must_use]
    pub fn get(&self, characteristic: Characteristic) -> Option<u8> {
        self.getters.get(&characteristic).map(|handler| handler())
    }

    /// Applies a set request.
    ///
    /// # Errors
    ///
    /// Returns `Error::CharacteristicNotWritable` for read-only or unhandled
    /// characteristics, `Error::Value` if `value` is out of range, or
    /// whatever the handler itself reports.
    pub fn set(&self, characteristic: Characteristic, value: u8) -> crate::Result<()> {
        if !characteristic.is_writable() {
            return Err(Error::CharacteristicNotWritable(characteristic));
        }
        let Some(handler) = self.setters.get(&characteristic) else {
            return Err(Error::CharacteristicNotWritable(characteristic));
        };

        let (min, max) = characteristic.range();
        if !(min..=max).contains(&value) {
            return Err(ValueError::OutOfRange {
                min: i64::from(min),
                max: i64::from(max),
                actual: i64::from(value),
            }
            .into());
        }

        handler(value)
    }
}

impl std::fmt::Debug for CharacteristicHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacteristicHandlers")
            .field("getters", &self.getters.keys().collect::<Vec<_>>())
            .field("setters", &self.setters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU8, Ordering};

    use super::*;

    #[test]
    fn set_calls_handler() {
        let seen = Arc::new(AtomicU8::new(0));
        let seen_clone = Arc::clone(&seen);
        let handlers = CharacteristicHandlers::new().with_set(
            Characteristic::TargetPosition,
            move |value| {
                seen_clone.store(value, Ordering::SeqCst);
                Ok(())
            },
        );

        handlers.set(Characteristic::TargetPosition, 30).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 30);
    }

    #[test]
    fn set_rejects_read_only() {
        let handlers = CharacteristicHandlers::new()
            .with_set(Characteristic::CurrentPosition, |_| Ok(()));
        let err = handlers
            .set(Characteristic::CurrentPosition, 10)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CharacteristicNotWritable(Characteristic::CurrentPosition)
        ));
    }

    #[test]
    fn set_without_handler_is_rejected() {
        let handlers = CharacteristicHandlers::new();
        assert!(handlers.set(Characteristic::TargetPosition, 10).is_err());
    }

    #[test]
    fn set_rejects_out_of_range() {
        let handlers =
            CharacteristicHandlers::new().with_set(Characteristic::TargetPosition, |_| Ok(()));
        let err = handlers.set(Characteristic::TargetPosition, 101).unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::OutOfRange { .. })));
    }
}
