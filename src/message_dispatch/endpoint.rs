//! Endpoint URIs — `camunda-bpm:message?<param>=<value>&...`.
//!
//! An endpoint fixes the operation selector for every exchange sent to it:
//! either `activityId` (signal) or `messageName` (message, optionally with a
//! `correlationKeyName`). Everything else about a request comes from the
//! exchange at dispatch time.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use super::constants::{
    ACTIVITY_ID_PARAMETER, CAMUNDA_BPM_SCHEME, CORRELATION_KEY_NAME_PARAMETER,
    MESSAGE_NAME_PARAMETER, MESSAGE_OPERATION,
};
use super::types::DispatchParams;
use crate::error::{DispatchError, Result};

/// Which operation an endpoint performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OperationSelector {
    Signal {
        activity_id: String,
    },
    Message {
        message_name: String,
        correlation_key_name: Option<String>,
    },
}

/// A parsed and validated endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    uri: String,
    selector: OperationSelector,
}

impl EndpointConfig {
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri).map_err(|e| {
            DispatchError::configuration(format!("invalid endpoint URI '{}': {}", uri, e))
        })?;

        if url.scheme() != CAMUNDA_BPM_SCHEME {
            return Err(DispatchError::configuration(format!(
                "endpoint URI '{}' must use the '{}' scheme",
                uri, CAMUNDA_BPM_SCHEME
            )));
        }
        let operation = url.path().trim_matches('/');
        if operation != MESSAGE_OPERATION {
            return Err(DispatchError::configuration(format!(
                "unsupported endpoint operation '{}' in '{}'",
                operation, uri
            )));
        }

        let mut params = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            let key = key.into_owned();
            if ![
                ACTIVITY_ID_PARAMETER,
                MESSAGE_NAME_PARAMETER,
                CORRELATION_KEY_NAME_PARAMETER,
            ]
            .contains(&key.as_str())
            {
                return Err(DispatchError::configuration(format!(
                    "unknown parameter '{}' in '{}'",
                    key, uri
                )));
            }
            if value.is_empty() {
                return Err(DispatchError::configuration(format!(
                    "parameter '{}' in '{}' has no value",
                    key, uri
                )));
            }
            if params.insert(key.clone(), value.into_owned()).is_some() {
                return Err(DispatchError::configuration(format!(
                    "parameter '{}' given more than once in '{}'",
                    key, uri
                )));
            }
        }

        let selector = Self::selector_from_params(uri, params)?;
        Ok(Self {
            uri: uri.to_string(),
            selector,
        })
    }

    fn selector_from_params(
        uri: &str,
        mut params: BTreeMap<String, String>,
    ) -> Result<OperationSelector> {
        let activity_id = params.remove(ACTIVITY_ID_PARAMETER);
        let message_name = params.remove(MESSAGE_NAME_PARAMETER);
        let correlation_key_name = params.remove(CORRELATION_KEY_NAME_PARAMETER);

        match (activity_id, message_name) {
            (Some(_), Some(_)) => Err(DispatchError::configuration(format!(
                "'{}' and '{}' are mutually exclusive in '{}'",
                ACTIVITY_ID_PARAMETER, MESSAGE_NAME_PARAMETER, uri
            ))),
            (Some(activity_id), None) => match correlation_key_name {
                Some(_) => Err(DispatchError::configuration(format!(
                    "'{}' only applies to '{}' endpoints, not '{}' ('{}')",
                    CORRELATION_KEY_NAME_PARAMETER,
                    MESSAGE_NAME_PARAMETER,
                    ACTIVITY_ID_PARAMETER,
                    uri
                ))),
                None => Ok(OperationSelector::Signal { activity_id }),
            },
            (None, Some(message_name)) => Ok(OperationSelector::Message {
                message_name,
                correlation_key_name,
            }),
            (None, None) => Err(DispatchError::configuration(format!(
                "endpoint '{}' needs either '{}' or '{}'",
                uri, ACTIVITY_ID_PARAMETER, MESSAGE_NAME_PARAMETER
            ))),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn selector(&self) -> &OperationSelector {
        &self.selector
    }

    /// Parameters fixed by the endpoint; the exchange fills in the rest.
    pub fn base_params(&self) -> DispatchParams {
        match &self.selector {
            OperationSelector::Signal { activity_id } => DispatchParams {
                activity_id: Some(activity_id.clone()),
                ..Default::default()
            },
            OperationSelector::Message {
                message_name,
                correlation_key_name,
            } => DispatchParams {
                message_name: Some(message_name.clone()),
                correlation_key_name: correlation_key_name.clone(),
                ..Default::default()
            },
        }
    }
}

impl FromStr for EndpointConfig {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
