use serde::Serialize;
use serde_json::{Map, Value};

/// A stored JSON object together with its server-assigned id.
///
/// Serializes as the body with the id merged in under `_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Document {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }
}
