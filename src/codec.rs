//! Payload decoding.
//!
//! Raw payloads pulled from the queue are turned into [`Event`]s here. A payload
//! that cannot be decoded yields a [`DecodeError`]; callers log it and drop the
//! message.

use crate::Event;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Failure to turn a raw payload into an event
#[derive(Error, Debug)]
#[error("Failed to create event with '{payload}': {cause}")]
pub struct DecodeError {
    payload: String,
    #[source]
    cause: DecodeCause,
}

impl DecodeError {
    pub(crate) fn new(payload: impl Into<String>, cause: DecodeCause) -> Self {
        Self {
            payload: payload.into(),
            cause,
        }
    }

    /// The payload that failed to decode
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The underlying cause
    pub fn cause(&self) -> &DecodeCause {
        &self.cause
    }
}

/// Why a payload was rejected
#[derive(Error, Debug)]
pub enum DecodeCause {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Payload format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Payload is a JSON object whose fields become the event
    #[default]
    Json,
    /// Payload is free text stored under the `message` field
    Plain,
}

impl Codec {
    /// Decode a raw payload into an event
    pub fn decode(&self, raw: &str) -> Result<Event, DecodeError> {
        match self {
            Codec::Json => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(fields)) => Ok(Event::new(fields)),
                Ok(other) => Err(DecodeError::new(
                    raw,
                    DecodeCause::NotAnObject(json_kind(&other)),
                )),
                Err(e) => Err(DecodeError::new(raw, DecodeCause::Json(e))),
            },
            Codec::Plain => Ok(Event::from_message(raw)),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Json => write!(f, "json"),
            Codec::Plain => write!(f, "plain"),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
