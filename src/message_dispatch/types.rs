//! Core types for message dispatch.
//!
//! The routing layer hands over a flat `DispatchParams` with every field
//! optional. It is converted once, at the boundary, into the tagged
//! `DispatchRequest` so the resolver never has to re-check field combinations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DispatchError;

/// Process variables passed along with a signal or message.
pub type VariableMap = BTreeMap<String, serde_json::Value>;

// ─── Flat parameters ─────────────────────────────────────────────────────────

/// Request parameters as collected from endpoint configuration and exchange
/// properties. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchParams {
    #[serde(default)]
    pub message_name: Option<String>,
    #[serde(default)]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub business_key: Option<String>,
    #[serde(default)]
    pub correlation_key_name: Option<String>,
    #[serde(default)]
    pub correlation_key_value: Option<String>,
    #[serde(default)]
    pub process_instance_id: Option<String>,
    #[serde(default)]
    pub payload: VariableMap,
}

// ─── Tagged request ──────────────────────────────────────────────────────────

/// A validated dispatch request: either a signal or a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DispatchRequest {
    Signal(SignalRequest),
    Message(MessageRequest),
}

/// Resume the execution waiting at `activity_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRequest {
    pub activity_id: String,
    pub target: ProcessTarget,
    #[serde(default)]
    pub payload: VariableMap,
}

/// Deliver or correlate the message `message_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    pub message_name: String,
    pub target: MessageTarget,
    #[serde(default)]
    pub correlation: Option<CorrelationKey>,
    #[serde(default)]
    pub payload: VariableMap,
}

/// How a signal identifies its process instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProcessTarget {
    ProcessInstance(String),
    BusinessKey(String),
}

/// How a message identifies its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MessageTarget {
    /// Deliver straight to the execution subscribed in this instance.
    ProcessInstance(String),
    /// Let the engine correlate, narrowed to this business key.
    BusinessKey(String),
    /// Let the engine correlate on message name and correlation keys only.
    Unbound,
}

/// A single correlation key binding (`correlationKeyName` → property value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationKey {
    pub name: String,
    pub value: String,
}

impl CorrelationKey {
    /// Both the configured name and the exchange value must be present.
    pub fn from_parts(name: Option<String>, value: Option<String>) -> Option<Self> {
        match (non_empty(name), non_empty(value)) {
            (Some(name), Some(value)) => Some(Self { name, value }),
            _ => None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<DispatchParams> for DispatchRequest {
    type Error = DispatchError;

    fn try_from(params: DispatchParams) -> Result<Self, Self::Error> {
        let DispatchParams {
            message_name,
            activity_id,
            business_key,
            correlation_key_name,
            correlation_key_value,
            process_instance_id,
            payload,
        } = params;

        let business_key = non_empty(business_key);
        let process_instance_id = non_empty(process_instance_id);

        match (non_empty(activity_id), non_empty(message_name)) {
            (Some(activity_id), Some(message_name)) => Err(DispatchError::configuration(format!(
                "activityId '{}' and messageName '{}' are mutually exclusive",
                activity_id, message_name
            ))),
            (Some(activity_id), None) => {
                let target = match (business_key, process_instance_id) {
                    (Some(bk), _) => ProcessTarget::BusinessKey(bk),
                    (None, Some(pid)) => ProcessTarget::ProcessInstance(pid),
                    (None, None) => return Err(DispatchError::MissingIdentifier { activity_id }),
                };
                Ok(Self::Signal(SignalRequest {
                    activity_id,
                    target,
                    payload,
                }))
            }
            (None, Some(message_name)) => {
                let target = match (business_key, process_instance_id) {
                    (Some(bk), _) => MessageTarget::BusinessKey(bk),
                    (None, Some(pid)) => MessageTarget::ProcessInstance(pid),
                    (None, None) => MessageTarget::Unbound,
                };
                Ok(Self::Message(MessageRequest {
                    message_name,
                    target,
                    correlation: CorrelationKey::from_parts(
                        correlation_key_name,
                        correlation_key_value,
                    ),
                    payload,
                }))
            }
            (None, None) => Err(DispatchError::configuration(
                "neither activityId nor messageName is configured",
            )),
        }
    }
}

impl DispatchRequest {
    pub fn payload(&self) -> &VariableMap {
        match self {
            Self::Signal(r) => &r.payload,
            Self::Message(r) => &r.payload,
        }
    }
}

// ─── Correlation map ─────────────────────────────────────────────────────────

/// Correlation keys handed to the engine. Holds zero or one entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationMap(VariableMap);

impl CorrelationMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_key(key: Option<&CorrelationKey>) -> Self {
        let mut map = VariableMap::new();
        if let Some(key) = key {
            map.insert(
                key.name.clone(),
                serde_json::Value::String(key.value.clone()),
            );
        }
        Self(map)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    pub fn as_map(&self) -> &VariableMap {
        &self.0
    }
}

// ─── Engine references ───────────────────────────────────────────────────────

/// A process instance as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInstanceRef {
    pub id: String,
    pub business_key: Option<String>,
}

/// An execution as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRef {
    pub id: String,
    pub process_instance_id: String,
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Which terminal engine call a dispatch ended with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Signalled {
        execution_id: String,
    },
    MessageDelivered {
        execution_id: String,
    },
    MessageCorrelated {
        business_key: Option<String>,
        correlation_keys: usize,
    },
}

// ─── Tests ───────────────────────────────────────────────────────────────────
