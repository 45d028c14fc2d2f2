use std::collections::HashMap;

use serde_json::Value as Json;

use super::error::RecordError;
use super::Value;

/// Evaluation data keyed by field path.
///
/// Paths are stored whole: `"user.age"` is one key, whether it was set
/// directly or reached through a nested JSON object. A path that was never
/// set is absent.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Store `value` under `path`, replacing any earlier value.
    pub fn insert(&mut self, path: &str, value: Value) {
        self.fields.insert(path.to_owned(), value);
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a JSON object into a record.
    ///
    /// Integers become [`Value::Int`], other numbers [`Value::Float`]. `null`
    /// members are treated as absent. Arrays are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the text is not valid JSON, is not an
    /// object, or contains an array.
    pub fn from_json(text: &str) -> Result<Self, RecordError> {
        let json: Json = serde_json::from_str(text)?;
        Self::from_json_value(&json)
    }

    /// Build a record from an already decoded JSON value.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json).
    pub fn from_json_value(json: &Json) -> Result<Self, RecordError> {
        let Json::Object(members) = json else {
            return Err(RecordError::NotAnObject);
        };
        let mut record = Record::new();
        let mut path = String::new();
        record.absorb_object(&mut path, members)?;
        Ok(record)
    }

    // `path` holds the prefix of the enclosing object and is restored on return.
    fn absorb_object(
        &mut self,
        path: &mut String,
        members: &serde_json::Map<String, Json>,
    ) -> Result<(), RecordError> {
        let prefix_len = path.len();
        for (key, json) in members {
            if prefix_len > 0 {
                path.push('.');
            }
            path.push_str(key);
            let value = match json {
                Json::Null => None,
                Json::Bool(b) => Some(Value::Bool(*b)),
                Json::Number(n) => Some(match n.as_i64() {
                    Some(i) => Value::Int(i),
                    None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
                }),
                Json::String(s) => Some(Value::String(s.clone())),
                Json::Array(_) => {
                    return Err(RecordError::UnsupportedValue {
                        field: path.clone(),
                        kind: "array",
                    })
                }
                Json::Object(nested) => {
                    self.absorb_object(path, nested)?;
                    None
                }
            };
            if let Some(value) = value {
                self.fields.insert(path.clone(), value);
            }
            path.truncate(prefix_len);
        }
        Ok(())
    }
}
