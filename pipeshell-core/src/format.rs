//! Record encoding
//!
//! A [`RecordFormat`] turns a [`LogRecord`] into a single JSON object
//! followed by a newline. Field names are carried by the format value
//! itself, so two loggers in one process can use different layouts.

use serde_json::{Map, Value};

use crate::domain::log::LogRecord;

/// Field naming for encoded records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFormat {
    pub timestamp_field: String,
    pub level_field: String,
    pub message_field: String,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            timestamp_field: "timestamp".to_string(),
            level_field: "level".to_string(),
            message_field: "msg".to_string(),
        }
    }
}

impl RecordFormat {
    /// Encodes a record as one newline-terminated JSON object
    ///
    /// Attributes are written first so that the timestamp, level and message
    /// fields always win when an attribute reuses one of their names.
    pub fn encode(&self, record: &LogRecord) -> Vec<u8> {
        let mut object = Map::new();

        for (key, value) in &record.attributes {
            object.insert(key.clone(), Value::String(value.clone()));
        }

        object.insert(self.level_field.clone(), Value::from(record.level.as_str()));
        object.insert(self.timestamp_field.clone(), Value::from(record.timestamp));
        object.insert(
            self.message_field.clone(),
            Value::String(record.message.clone()),
        );

        let mut line = Value::Object(object).to_string().into_bytes();
        line.push(b'\n');
        line
    }

    /// Validates the field names
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            &self.timestamp_field,
            &self.level_field,
            &self.message_field,
        ];

        if fields.iter().any(|f| f.is_empty()) {
            return Err("record field names cannot be empty".to_string());
        }

        if self.timestamp_field == self.level_field
            || self.timestamp_field == self.message_field
            || self.level_field == self.message_field
        {
            return Err("record field names must be distinct".to_string());
        }

        Ok(())
    }
}
