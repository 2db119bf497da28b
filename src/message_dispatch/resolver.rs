//! MessageDispatchResolver — decides which runtime call a request turns into.
//!
//! | Request | Lookups | Terminal call |
//! |---|---|---|
//! | signal, business key | instance by business key, execution at activity | `signal` |
//! | signal, process instance | execution at activity | `signal` |
//! | message, process instance | execution subscribed to message | `deliver_message_to_execution` |
//! | message, business key | none | `correlate_message` with business key |
//! | message, unbound | none | `correlate_message` without business key |
//!
//! The resolver keeps no state between calls and never retries. Lookups and the
//! action are separate engine round-trips; anything that changes in between is
//! the engine's concern.

use crate::error::{DispatchError, LookupTarget, Result};

use super::runtime::{ExecutionQuery, RuntimeService};
use super::types::{
    CorrelationMap, DispatchOutcome, DispatchRequest, ExecutionRef, MessageRequest, MessageTarget,
    ProcessTarget, SignalRequest,
};

// ---------------------------------------------------------------------------
// MessageDispatchResolver
// ---------------------------------------------------------------------------

/// Turns a `DispatchRequest` into exactly one state-changing engine call.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageDispatchResolver;

impl MessageDispatchResolver {
    pub fn new() -> Self {
        Self
    }

    /// Dispatch one request against the engine.
    pub async fn dispatch(
        &self,
        request: &DispatchRequest,
        engine: &dyn RuntimeService,
    ) -> Result<DispatchOutcome> {
        match request {
            DispatchRequest::Signal(signal) => self.dispatch_signal(signal, engine).await,
            DispatchRequest::Message(message) => self.dispatch_message(message, engine).await,
        }
    }

    async fn dispatch_signal(
        &self,
        request: &SignalRequest,
        engine: &dyn RuntimeService,
    ) -> Result<DispatchOutcome> {
        // 1. Resolve the process instance id, going through the business key if needed.
        let process_instance_id = match &request.target {
            ProcessTarget::ProcessInstance(id) => id.clone(),
            ProcessTarget::BusinessKey(business_key) => {
                tracing::debug!(
                    business_key = business_key.as_str(),
                    "Resolving process instance by business key"
                );
                let instance = engine
                    .find_process_instance_by_business_key(business_key)
                    .await?
                    .ok_or_else(|| {
                        not_found(LookupTarget::ProcessInstance {
                            business_key: business_key.clone(),
                        })
                    })?;
                instance.id
            }
        };

        // 2. Find the execution waiting at the activity.
        let query = ExecutionQuery::waiting_at_activity(&process_instance_id, &request.activity_id);
        let execution = find_single_execution(engine, &query).await?;

        // 3. Signal it.
        engine.signal(&execution.id, &request.payload).await?;

        tracing::info!(
            activity_id = request.activity_id.as_str(),
            process_instance_id = process_instance_id.as_str(),
            execution_id = execution.id.as_str(),
            variables = request.payload.len(),
            "Signalled execution"
        );

        Ok(DispatchOutcome::Signalled {
            execution_id: execution.id,
        })
    }

    async fn dispatch_message(
        &self,
        request: &MessageRequest,
        engine: &dyn RuntimeService,
    ) -> Result<DispatchOutcome> {
        let message_name = request.message_name.as_str();

        let business_key = match &request.target {
            MessageTarget::ProcessInstance(process_instance_id) => {
                let query = ExecutionQuery::subscribed_to_message(process_instance_id, message_name);
                let execution = find_single_execution(engine, &query).await?;

                engine
                    .deliver_message_to_execution(message_name, &execution.id, &request.payload)
                    .await?;

                tracing::info!(
                    message_name,
                    process_instance_id = process_instance_id.as_str(),
                    execution_id = execution.id.as_str(),
                    variables = request.payload.len(),
                    "Delivered message to execution"
                );

                return Ok(DispatchOutcome::MessageDelivered {
                    execution_id: execution.id,
                });
            }
            MessageTarget::BusinessKey(business_key) => Some(business_key.as_str()),
            MessageTarget::Unbound => None,
        };

        let correlation_keys = CorrelationMap::from_key(request.correlation.as_ref());
        engine
            .correlate_message(
                message_name,
                business_key,
                &correlation_keys,
                &request.payload,
            )
            .await?;

        tracing::info!(
            message_name,
            business_key = business_key.unwrap_or("<none>"),
            correlation_keys = correlation_keys.len(),
            variables = request.payload.len(),
            "Correlated message"
        );

        Ok(DispatchOutcome::MessageCorrelated {
            business_key: business_key.map(str::to_string),
            correlation_keys: correlation_keys.len(),
        })
    }
}

async fn find_single_execution(
    engine: &dyn RuntimeService,
    query: &ExecutionQuery,
) -> Result<ExecutionRef> {
    tracing::debug!(
        process_instance_id = query.process_instance_id.as_str(),
        activity_id = query.activity_id.as_deref().unwrap_or("<any>"),
        message_name = query
            .message_event_subscription_name
            .as_deref()
            .unwrap_or("<any>"),
        "Looking up execution"
    );
    engine.find_execution(query).await?.ok_or_else(|| {
        not_found(LookupTarget::Execution {
            process_instance_id: query.process_instance_id.clone(),
            activity_id: query.activity_id.clone(),
            message_name: query.message_event_subscription_name.clone(),
        })
    })
}

fn not_found(what: LookupTarget) -> DispatchError {
    tracing::warn!(lookup = %what, "Dispatch lookup found nothing");
    DispatchError::NotFound { what }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
