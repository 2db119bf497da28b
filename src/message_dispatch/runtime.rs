use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::types::{CorrelationMap, ExecutionRef, ProcessInstanceRef, VariableMap};

/// Filter for a single-execution lookup within one process instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionQuery {
    pub process_instance_id: String,
    pub activity_id: Option<String>,
    pub message_event_subscription_name: Option<String>,
}

impl ExecutionQuery {
    pub fn waiting_at_activity(process_instance_id: &str, activity_id: &str) -> Self {
        Self {
            process_instance_id: process_instance_id.to_string(),
            activity_id: Some(activity_id.to_string()),
            message_event_subscription_name: None,
        }
    }

    pub fn subscribed_to_message(process_instance_id: &str, message_name: &str) -> Self {
        Self {
            process_instance_id: process_instance_id.to_string(),
            activity_id: None,
            message_event_subscription_name: Some(message_name.to_string()),
        }
    }
}

/// The slice of the process engine's runtime service the dispatcher uses.
///
/// Implementations own all state. Lookups return `Ok(None)` on no match and an
/// error when the engine finds more than one candidate. Every error is passed
/// back to the caller of `dispatch` untouched.
#[async_trait]
pub trait RuntimeService: Send + Sync {
    // ── Queries ──

    async fn find_process_instance_by_business_key(
        &self,
        business_key: &str,
    ) -> Result<Option<ProcessInstanceRef>>;

    async fn find_execution(&self, query: &ExecutionQuery) -> Result<Option<ExecutionRef>>;

    // ── Actions ──

    async fn signal(&self, execution_id: &str, variables: &VariableMap) -> Result<()>;

    async fn deliver_message_to_execution(
        &self,
        message_name: &str,
        execution_id: &str,
        variables: &VariableMap,
    ) -> Result<()>;

    /// Correlate a message, optionally narrowed to a business key.
    async fn correlate_message(
        &self,
        message_name: &str,
        business_key: Option<&str>,
        correlation_keys: &CorrelationMap,
        variables: &VariableMap,
    ) -> Result<()>;
}
