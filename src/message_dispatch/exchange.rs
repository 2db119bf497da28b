//! Exchange — the routing layer's unit of work as seen by the producer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::constants::CAMEL_BODY_VARIABLE;
use super::types::VariableMap;

/// Named properties plus an optional body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl Exchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Read a property as a string. Scalars are rendered, structured values
    /// and null are treated as absent.
    pub fn property_str(&self, name: &str) -> Option<String> {
        match self.properties.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Process variables carried by the body.
    ///
    /// A JSON object contributes its entries; any other non-null body becomes
    /// the single variable `camelBody`.
    pub fn variables(&self) -> VariableMap {
        match &self.body {
            None | Some(Value::Null) => VariableMap::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Some(other) => {
                let mut vars = VariableMap::new();
                vars.insert(CAMEL_BODY_VARIABLE.to_string(), other.clone());
                vars
            }
        }
    }
}
