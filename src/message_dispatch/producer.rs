//! MessageProducer — binds one endpoint to a runtime and processes exchanges.

use std::sync::Arc;

use super::constants::{
    CAMUNDA_BPM_BUSINESS_KEY, CAMUNDA_BPM_CORRELATION_KEY, CAMUNDA_BPM_PROCESS_INSTANCE_ID,
};
use super::endpoint::EndpointConfig;
use super::exchange::Exchange;
use super::resolver::MessageDispatchResolver;
use super::runtime::RuntimeService;
use super::types::{DispatchOutcome, DispatchParams, DispatchRequest};
use crate::error::Result;

/// Sends exchanges to the process engine as signals or messages.
///
/// Holds nothing per request, so one producer can serve concurrent exchanges.
pub struct MessageProducer {
    endpoint: EndpointConfig,
    runtime: Arc<dyn RuntimeService>,
    resolver: MessageDispatchResolver,
}

impl MessageProducer {
    pub fn new(endpoint: EndpointConfig, runtime: Arc<dyn RuntimeService>) -> Self {
        Self {
            endpoint,
            runtime,
            resolver: MessageDispatchResolver::new(),
        }
    }

    /// Parse `uri` and build a producer for it.
    pub fn from_uri(uri: &str, runtime: Arc<dyn RuntimeService>) -> Result<Self> {
        Ok(Self::new(EndpointConfig::parse(uri)?, runtime))
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Collect endpoint parameters and exchange properties into a request.
    pub fn request_for(&self, exchange: &Exchange) -> Result<DispatchRequest> {
        let params = DispatchParams {
            business_key: exchange.property_str(CAMUNDA_BPM_BUSINESS_KEY),
            process_instance_id: exchange.property_str(CAMUNDA_BPM_PROCESS_INSTANCE_ID),
            correlation_key_value: exchange.property_str(CAMUNDA_BPM_CORRELATION_KEY),
            payload: exchange.variables(),
            ..self.endpoint.base_params()
        };
        DispatchRequest::try_from(params)
    }

    /// Dispatch one exchange.
    pub async fn process(&self, exchange: &Exchange) -> Result<DispatchOutcome> {
        let request = self.request_for(exchange)?;
        let outcome = self
            .resolver
            .dispatch(&request, self.runtime.as_ref())
            .await;

        if let Err(e) = &outcome {
            tracing::error!(
                endpoint = self.endpoint.uri(),
                error = %e,
                retryable = e.is_retryable(),
                "Dispatch failed"
            );
        }
        outcome
    }
}
