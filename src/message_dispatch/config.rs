//! Dispatch configuration — load named endpoints from YAML, look them up by name.
//!
//! The routing layer refers to endpoints by name; each name maps to one
//! `camunda-bpm:` URI that is parsed and validated when the index is built, so
//! a bad URI fails at startup rather than on the first exchange.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use super::endpoint::EndpointConfig;
use crate::error::DispatchError;

// ---------------------------------------------------------------------------
// DispatchConfig
// ---------------------------------------------------------------------------

/// Root dispatch configuration loaded from YAML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DispatchConfig {
    pub endpoints: Vec<EndpointBinding>,
}

/// A named endpoint URI.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EndpointBinding {
    pub name: String,
    pub uri: String,
}

/// Validated endpoints indexed by name.
#[derive(Debug, Clone)]
pub struct EndpointConfigIndex {
    by_name: HashMap<String, EndpointConfig>,
}

impl EndpointConfigIndex {
    /// Parse every endpoint URI and index by name.
    pub fn from_config(config: &DispatchConfig) -> std::result::Result<Self, DispatchError> {
        let mut by_name = HashMap::new();

        for binding in &config.endpoints {
            let endpoint = EndpointConfig::parse(&binding.uri).map_err(|e| match e {
                DispatchError::Configuration { reason } => DispatchError::configuration(format!(
                    "endpoint '{}': {}",
                    binding.name, reason
                )),
                other => other,
            })?;

            if by_name.insert(binding.name.clone(), endpoint).is_some() {
                return Err(DispatchError::configuration(format!(
                    "endpoint '{}' is defined more than once",
                    binding.name
                )));
            }
        }

        tracing::debug!(endpoints = by_name.len(), "Indexed dispatch endpoints");
        Ok(Self { by_name })
    }

    /// Load from a YAML file and build the index.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        let config: DispatchConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Parsing {}", path.display()))?;
        Self::from_config(&config).with_context(|| format!("Validating {}", path.display()))
    }

    pub fn endpoint(&self, name: &str) -> Option<&EndpointConfig> {
        self.by_name.get(name)
    }

    /// Endpoint names, sorted.
    pub fn endpoint_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
