// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the shutter bridge.
//!
//! This module provides the error hierarchy used across the crate: value
//! validation, MQTT publishing, payload parsing, and configuration loading.

use thiserror::Error;

use crate::accessory::Characteristic;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a device payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The accessory configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The host attempted to write a read-only characteristic.
    #[error("characteristic {0} is not writable")]
    CharacteristicNotWritable(Characteristic),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// A Tasmota shutter direction code other than -1, 0 or 1.
    #[error("unknown direction: {0}")]
    InvalidDirection(i64),
}

/// Errors related to MQTT communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The MQTT client refused the request.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// A transport other than the built-in MQTT client refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The bridge was started outside a Tokio runtime.
    #[error("no async runtime: {0}")]
    Runtime(String),

    /// Invalid broker URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to parsing Tasmota shutter payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The payload is not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected payload format.
    #[error("unexpected payload format: {0}")]
    UnexpectedFormat(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors raised while loading the accessory configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration is not valid JSON or has wrongly typed keys.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required key is missing or empty.
    #[error("missing configuration key: {0}")]
    MissingField(&'static str),

    /// A key holds an unusable value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// The configuration key.
        key: &'static str,
        /// Description of the problem.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
