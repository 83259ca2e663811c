//! Event - structured records handed to the downstream sink

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name used for the raw text of plain-encoded events
pub const MESSAGE_FIELD: &str = "message";

/// A decoded message, ready for the downstream pipeline
///
/// An event is a JSON object. Its content is fully determined by the payload it
/// was decoded from; the input never adds fields of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    fields: Map<String, Value>,
}

impl Event {
    /// Create an event from a JSON object
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Create an event carrying a single text `message` field
    ///
    /// # Example
    /// ```
    /// use queue_input_core::Event;
    ///
    /// let event = Event::from_message("service started");
    /// assert_eq!(event.message(), Some("service started"));
    /// ```
    pub fn from_message(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(MESSAGE_FIELD.to_string(), Value::String(message.into()));
        Self { fields }
    }

    /// Get a field by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The `message` field, when it holds a string
    pub fn message(&self) -> Option<&str> {
        self.get(MESSAGE_FIELD).and_then(Value::as_str)
    }

    /// Add or replace a field
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Take ownership of all fields
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// The event as a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Event {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

impl From<Event> for Value {
    fn from(event: Event) -> Self {
        Value::Object(event.fields)
    }
}
