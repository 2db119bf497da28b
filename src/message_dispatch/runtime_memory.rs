//! MemoryRuntime — in-process stand-in for the engine's runtime service.
//!
//! Holds process instances and waiting executions in memory and journals every
//! call made through `RuntimeService`, so tests can check both the order of
//! lookups and the exact arguments of the terminal action.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::runtime::{ExecutionQuery, RuntimeService};
use super::types::{CorrelationMap, ExecutionRef, ProcessInstanceRef, VariableMap};

/// One call received through `RuntimeService`, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCall {
    FindProcessInstanceByBusinessKey {
        business_key: String,
    },
    FindExecution(ExecutionQuery),
    Signal {
        execution_id: String,
        variables: VariableMap,
    },
    DeliverMessageToExecution {
        message_name: String,
        execution_id: String,
        variables: VariableMap,
    },
    CorrelateMessage {
        message_name: String,
        business_key: Option<String>,
        correlation_keys: CorrelationMap,
        variables: VariableMap,
    },
}

impl RuntimeCall {
    /// Lookups are queries; everything else changes engine state.
    pub fn is_action(&self) -> bool {
        !matches!(
            self,
            Self::FindProcessInstanceByBusinessKey { .. } | Self::FindExecution(_)
        )
    }
}

#[derive(Debug, Clone)]
struct WaitingExecution {
    id: String,
    process_instance_id: String,
    activity_id: Option<String>,
    message_subscription: Option<String>,
}

impl WaitingExecution {
    fn matches(&self, query: &ExecutionQuery) -> bool {
        self.process_instance_id == query.process_instance_id
            && query
                .activity_id
                .as_ref()
                .map_or(true, |a| self.activity_id.as_ref() == Some(a))
            && query
                .message_event_subscription_name
                .as_ref()
                .map_or(true, |m| self.message_subscription.as_ref() == Some(m))
    }

    fn to_ref(&self) -> ExecutionRef {
        ExecutionRef {
            id: self.id.clone(),
            process_instance_id: self.process_instance_id.clone(),
        }
    }
}

#[derive(Default)]
struct MemoryState {
    instances: Vec<ProcessInstanceRef>,
    executions: Vec<WaitingExecution>,
    calls: Vec<RuntimeCall>,
    fail_next: Option<String>,
}

impl MemoryState {
    /// Journal the call, then consume a pending injected failure if any.
    fn record(&mut self, call: RuntimeCall) -> Result<()> {
        self.calls.push(call);
        match self.fail_next.take() {
            Some(message) => Err(anyhow!(message)),
            None => Ok(()),
        }
    }

    fn take_execution(&mut self, execution_id: &str) -> Result<WaitingExecution> {
        let pos = self
            .executions
            .iter()
            .position(|e| e.id == execution_id)
            .ok_or_else(|| anyhow!("execution '{}' does not exist", execution_id))?;
        Ok(self.executions.remove(pos))
    }
}

/// In-memory `RuntimeService`.
///
/// Signalling or delivering a message to an execution consumes it, so a second
/// attempt fails the way a real engine would once the token has moved on.
/// Correlation is always accepted and only journalled.
#[derive(Default)]
pub struct MemoryRuntime {
    state: Mutex<MemoryState>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running process instance.
    pub async fn start_instance(&self, business_key: Option<&str>) -> ProcessInstanceRef {
        let instance = ProcessInstanceRef {
            id: Uuid::new_v4().to_string(),
            business_key: business_key.map(str::to_string),
        };
        self.state.lock().await.instances.push(instance.clone());
        instance
    }

    /// Park an execution at `activity_id` inside `process_instance_id`.
    pub async fn add_activity_execution(
        &self,
        process_instance_id: &str,
        activity_id: &str,
    ) -> ExecutionRef {
        self.add_execution(process_instance_id, Some(activity_id), None)
            .await
    }

    /// Park an execution waiting for `message_name` inside `process_instance_id`.
    pub async fn add_message_subscription(
        &self,
        process_instance_id: &str,
        message_name: &str,
    ) -> ExecutionRef {
        self.add_execution(process_instance_id, None, Some(message_name))
            .await
    }

    async fn add_execution(
        &self,
        process_instance_id: &str,
        activity_id: Option<&str>,
        message_subscription: Option<&str>,
    ) -> ExecutionRef {
        let execution = WaitingExecution {
            id: Uuid::new_v4().to_string(),
            process_instance_id: process_instance_id.to_string(),
            activity_id: activity_id.map(str::to_string),
            message_subscription: message_subscription.map(str::to_string),
        };
        let reference = execution.to_ref();
        self.state.lock().await.executions.push(execution);
        reference
    }

    /// Make the next call fail with `message` (after it is journalled).
    pub async fn fail_next(&self, message: &str) {
        self.state.lock().await.fail_next = Some(message.to_string());
    }

    /// Snapshot of the call journal.
    pub async fn calls(&self) -> Vec<RuntimeCall> {
        self.state.lock().await.calls.clone()
    }

    /// Only the state-changing calls from the journal.
    pub async fn actions(&self) -> Vec<RuntimeCall> {
        self.calls()
            .await
            .into_iter()
            .filter(RuntimeCall::is_action)
            .collect()
    }

    pub async fn waiting_executions(&self) -> usize {
        self.state.lock().await.executions.len()
    }
}

#[async_trait]
impl RuntimeService for MemoryRuntime {
    async fn find_process_instance_by_business_key(
        &self,
        business_key: &str,
    ) -> Result<Option<ProcessInstanceRef>> {
        let mut state = self.state.lock().await;
        state.record(RuntimeCall::FindProcessInstanceByBusinessKey {
            business_key: business_key.to_string(),
        })?;

        let mut matches = state
            .instances
            .iter()
            .filter(|i| i.business_key.as_deref() == Some(business_key));
        let first = matches.next().cloned();
        if matches.next().is_some() {
            bail!(
                "query for business key '{}' expected a single result",
                business_key
            );
        }
        Ok(first)
    }

    async fn find_execution(&self, query: &ExecutionQuery) -> Result<Option<ExecutionRef>> {
        let mut state = self.state.lock().await;
        state.record(RuntimeCall::FindExecution(query.clone()))?;

        let mut matches = state.executions.iter().filter(|e| e.matches(query));
        let first = matches.next().map(WaitingExecution::to_ref);
        if matches.next().is_some() {
            bail!(
                "execution query in process instance '{}' expected a single result",
                query.process_instance_id
            );
        }
        Ok(first)
    }

    async fn signal(&self, execution_id: &str, variables: &VariableMap) -> Result<()> {
        let mut state = self.state.lock().await;
        state.record(RuntimeCall::Signal {
            execution_id: execution_id.to_string(),
            variables: variables.clone(),
        })?;
        state.take_execution(execution_id)?;
        Ok(())
    }

    async fn deliver_message_to_execution(
        &self,
        message_name: &str,
        execution_id: &str,
        variables: &VariableMap,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.record(RuntimeCall::DeliverMessageToExecution {
            message_name: message_name.to_string(),
            execution_id: execution_id.to_string(),
            variables: variables.clone(),
        })?;

        let execution = state.take_execution(execution_id)?;
        if execution.message_subscription.as_deref() != Some(message_name) {
            let subscription = execution.message_subscription.clone();
            state.executions.push(execution);
            bail!(
                "execution '{}' has no subscription for message '{}' (subscribed: {:?})",
                execution_id,
                message_name,
                subscription
            );
        }
        Ok(())
    }

    async fn correlate_message(
        &self,
        message_name: &str,
        business_key: Option<&str>,
        correlation_keys: &CorrelationMap,
        variables: &VariableMap,
    ) -> Result<()> {
        self.state
            .lock()
            .await
            .record(RuntimeCall::CorrelateMessage {
                message_name: message_name.to_string(),
                business_key: business_key.map(str::to_string),
                correlation_keys: correlation_keys.clone(),
                variables: variables.clone(),
            })
    }
}
