use std::collections::BTreeMap;
use std::fmt;

use docconv_core::JobState;
use serde_json::{Map, Value};

/// Server-issued id of a submitted job, tied to the endpoint that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    uuid: String,
    endpoint: String,
}

impl JobHandle {
    pub fn new(uuid: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Decoded body of one status poll.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversionStatus {
    fields: Map<String, Value>,
}

impl ConversionStatus {
    /// Parses a JSON object; any other JSON value is rejected.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_slice(bytes)?;
        Ok(Self { fields })
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn state(&self) -> JobState {
        JobState::parse(self.get_str("state"))
    }

    pub fn download_url(&self) -> Option<&str> {
        self.get_str("downloadUrl")
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.get_str("previewUrl")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Flattens to strings: string values verbatim, anything else as JSON text.
    pub fn into_string_map(self) -> BTreeMap<String, String> {
        self.fields
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect()
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.fields.clone()))
    }
}
