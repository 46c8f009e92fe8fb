// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for the per-shutter object in Tasmota shutter payloads.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::state::StateChange;
use crate::types::{Position, PositionState};

/// One shutter's entry in a `RESULT` or `SENSOR` payload.
///
/// Every field is optional: `stat/<topic>/RESULT` usually carries only the
/// field that changed while `tele/<topic>/SENSOR` carries a full snapshot.
/// Values are kept raw so that a malformed field can be rejected without
/// losing the others.
///
/// # Examples
///
/// ```
/// use tasmota_blinds::telemetry::ShutterReport;
///
/// let json = r#"{"Shutter1":{"Position":42}}"#;
/// let report = ShutterReport::from_payload(json.as_bytes(), "Shutter1")
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(report.position().unwrap().unwrap().value(), 42);
/// assert!(report.direction().is_none());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShutterReport {
    /// Current opening (0-100).
    #[serde(rename = "Position", default)]
    position: Option<Value>,

    /// Movement direction (-1 closing, 0 idle, 1 opening).
    #[serde(rename = "Direction", default)]
    direction: Option<Value>,

    /// Position the shutter is moving to (0-100).
    #[serde(rename = "Target", default)]
    target: Option<Value>,
}

impl ShutterReport {
    /// Extracts the report for `shutter_name` from a raw payload.
    ///
    /// Returns `Ok(None)` when the payload is a JSON object without the
    /// shutter key, which is normal when several shutters share a topic.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is not UTF-8, not a JSON object,
    /// or the shutter entry is not an object.
    pub fn from_payload(payload: &[u8], shutter_name: &str) -> Result<Option<Self>, ParseError> {
        let text = std::str::from_utf8(payload)?;
        let mut object: serde_json::Map<String, Value> = serde_json::from_str(text)?;

        let Some(entry) = object.remove(shutter_name) else {
            return Ok(None);
        };

        if !entry.is_object() {
            return Err(ParseError::UnexpectedFormat(format!(
                "{shutter_name} is not an object"
            )));
        }

        serde_json::from_value(entry).map(Some).map_err(ParseError::Json)
    }

    /// Returns the reported position, if present.
    #[must_use]
    pub fn position(&self) -> Option<Result<Position, ParseError>> {
        self.position
            .as_ref()
            .map(|v| parse_position("Position", v))
    }

    /// Returns the raw direction code, if present.
    #[must_use]
    pub fn direction(&self) -> Option<Result<i64, ParseError>> {
        self.direction
            .as_ref()
            .map(|v| parse_integer("Direction", v))
    }

    /// Returns the reported target, if present.
    #[must_use]
    pub fn target(&self) -> Option<Result<Position, ParseError>> {
        self.target.as_ref().map(|v| parse_position("Target", v))
    }

    /// Converts the report into state changes.
    ///
    /// Fields are handled independently. A field that fails to parse, is out
    /// of range, or carries an unknown direction code is logged and skipped.
    #[must_use]
    pub fn to_state_changes(&self) -> Vec<StateChange> {
        let mut changes = Vec::with_capacity(3);

        match self.position() {
            Some(Ok(position)) => changes.push(StateChange::CurrentPosition(position)),
            Some(Err(e)) => tracing::warn!(error = %e, "Ignoring shutter position"),
            None => {}
        }

        match self.direction() {
            Some(Ok(code)) => match PositionState::from_direction(code) {
                Ok(state) => changes.push(StateChange::PositionState(state)),
                Err(_) => tracing::warn!(direction = code, "Unknown direction"),
            },
            Some(Err(e)) => tracing::warn!(error = %e, "Ignoring shutter direction"),
            None => {}
        }

        match self.target() {
            Some(Ok(target)) => changes.push(StateChange::TargetPosition(target)),
            Some(Err(e)) => tracing::warn!(error = %e, "Ignoring shutter target"),
            None => {}
        }

        changes
    }
}

/// Reads an integer the way Tasmota values show up in practice: JSON
/// integers, floats (truncated), or decimal strings.
fn parse_integer(field: &str, value: &Value) -> Result<i64, ParseError> {
    let invalid = |message: String| ParseError::InvalidValue {
        field: field.to_string(),
        message,
    };

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.abs() < 1e15 => Ok(truncate(f)),
                    _ => Err(invalid(format!("{n} is not a usable integer"))),
                }
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("{s:?} is not an integer"))),
        other => Err(invalid(format!("unexpected JSON value {other}"))),
    }
}

// Safe: callers bound the magnitude well inside i64
#[allow(clippy::cast_possible_truncation)]
fn truncate(f: f64) -> i64 {
    f.trunc() as i64
}

fn parse_position(field: &str, value: &Value) -> Result<Position, ParseError> {
    let raw = parse_integer(field, value)?;
    Position::try_from(raw).map_err(|e| ParseError::InvalidValue {
        field: field.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(json: &str) -> ShutterReport {
        ShutterReport::from_payload(json.as_bytes(), "Shutter1")
            .unwrap()
            .unwrap()
    }

    #[test]
    fn parse_full_telemetry_snapshot() {
        let json = r#"{"Time":"2020-09-12T13:55:32","Shutter1":{"Position":0,"Direction":0,"Target":0},"Shutter2":{"Position":100,"Direction":0,"Target":100}}"#;
        let changes = report(json).to_state_changes();

        assert_eq!(
            changes,
            vec![
                StateChange::CurrentPosition(Position::CLOSED),
                StateChange::PositionState(PositionState::Stopped),
                StateChange::TargetPosition(Position::CLOSED),
            ]
        );
    }

    #[test]
    fn parse_selects_named_shutter() {
        let json = r#"{"Shutter1":{"Position":10},"Shutter2":{"Position":90}}"#;
        let report = ShutterReport::from_payload(json.as_bytes(), "Shutter2")
            .unwrap()
            .unwrap();
        assert_eq!(report.position().unwrap().unwrap().value(), 90);
    }

    #[test]
    fn missing_shutter_is_none() {
        let json = r#"{"Shutter2":{"Position":100}}"#;
        let result = ShutterReport::from_payload(json.as_bytes(), "Shutter1").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn invalid_json_is_error() {
        let result = ShutterReport::from_payload(b"not json", "Shutter1");
        assert!(matches!(result, Err(ParseError::Json(_))));
    }

    #[test]
    fn non_object_payload_is_error() {
        let result = ShutterReport::from_payload(b"42", "Shutter1");
        assert!(matches!(result, Err(ParseError::Json(_))));
    }

    #[test]
    fn invalid_utf8_is_error() {
        let result = ShutterReport::from_payload(&[0xff, 0xfe, 0x7b], "Shutter1");
        assert!(matches!(result, Err(ParseError::Utf8(_))));
    }

    #[test]
    fn shutter_entry_must_be_object() {
        let result = ShutterReport::from_payload(br#"{"Shutter1":5}"#, "Shutter1");
        assert!(matches!(result, Err(ParseError::UnexpectedFormat(_))));
    }

    #[test]
    fn string_and_float_values_are_accepted() {
        let r = report(r#"{"Shutter1":{"Position":"42","Target":37.9,"Direction":"-1"}}"#);
        assert_eq!(r.position().unwrap().unwrap().value(), 42);
        assert_eq!(r.target().unwrap().unwrap().value(), 37);
        assert_eq!(r.direction().unwrap().unwrap(), -1);
    }

    #[test]
    fn bad_field_does_not_drop_others() {
        let r = report(r#"{"Shutter1":{"Position":"abc","Direction":1,"Target":150}}"#);
        assert!(r.position().unwrap().is_err());
        assert!(r.target().unwrap().is_err());

        assert_eq!(
            r.to_state_changes(),
            vec![StateChange::PositionState(PositionState::Increasing)]
        );
    }

    #[test]
    fn unknown_direction_is_skipped() {
        let r = report(r#"{"Shutter1":{"Direction":5,"Target":20}}"#);
        assert_eq!(
            r.to_state_changes(),
            vec![StateChange::TargetPosition(Position::new(20).unwrap())]
        );
    }

    #[test]
    fn extra_fields_are_ignored() {
        let r = report(r#"{"Shutter1":{"Position":55,"Tilt":0,"Mode":"0"}}"#);
        assert_eq!(
            r.to_state_changes(),
            vec![StateChange::CurrentPosition(Position::new(55).unwrap())]
        );
    }

    #[test]
    fn null_fields_count_as_absent() {
        let r = report(r#"{"Shutter1":{"Position":null,"Direction":null,"Target":30}}"#);
        assert!(r.position().is_none());
        assert!(r.direction().is_none());
        assert_eq!(
            r.to_state_changes(),
            vec![StateChange::TargetPosition(Position::new(30).unwrap())]
        );
    }
}
