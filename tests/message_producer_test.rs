//! MessageProducer end-to-end: endpoint URI + exchange → runtime calls.
//!
//! Every test drives a producer built from a `camunda-bpm:` URI against a
//! `MemoryRuntime` and checks the journal of calls the engine received.

use std::sync::Arc;

use bpmn_dispatch::message_dispatch::constants::{
    camunda_bpm_uri, ACTIVITY_ID_PARAMETER, CAMUNDA_BPM_BUSINESS_KEY,
    CAMUNDA_BPM_CORRELATION_KEY, CAMUNDA_BPM_PROCESS_INSTANCE_ID, CORRELATION_KEY_NAME_PARAMETER,
    MESSAGE_NAME_PARAMETER,
};
use bpmn_dispatch::message_dispatch::{
    DispatchOutcome, Exchange, ExecutionQuery, MemoryRuntime, MessageProducer, OperationSelector,
    RuntimeCall,
};
use bpmn_dispatch::DispatchError;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn signal_uri() -> String {
    camunda_bpm_uri(&format!("message?{}=anActivityId", ACTIVITY_ID_PARAMETER))
}

fn message_uri() -> String {
    camunda_bpm_uri(&format!("message?{}=aMessageName", MESSAGE_NAME_PARAMETER))
}

fn message_with_correlation_uri() -> String {
    camunda_bpm_uri(&format!(
        "message?{}=aMessageName&{}=aCorrelationKeyName",
        MESSAGE_NAME_PARAMETER, CORRELATION_KEY_NAME_PARAMETER
    ))
}

fn producer(uri: &str, runtime: &Arc<MemoryRuntime>) -> MessageProducer {
    MessageProducer::from_uri(uri, runtime.clone()).expect("valid endpoint")
}

/// The single correlate call in the journal, as (business_key, correlation size, pair).
async fn only_correlation(
    runtime: &MemoryRuntime,
) -> (Option<String>, usize, Option<serde_json::Value>) {
    let calls = runtime.calls().await;
    assert_eq!(calls.len(), 1, "expected exactly one call, got {calls:?}");
    match &calls[0] {
        RuntimeCall::CorrelateMessage {
            message_name,
            business_key,
            correlation_keys,
            ..
        } => {
            assert_eq!(message_name, "aMessageName");
            (
                business_key.clone(),
                correlation_keys.len(),
                correlation_keys.get("aCorrelationKeyName").cloned(),
            )
        }
        other => panic!("expected CorrelateMessage, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Producer construction
// ---------------------------------------------------------------------------

#[test]
fn signal_producer_from_uri() {
    let runtime = Arc::new(MemoryRuntime::new());
    let producer = producer(&signal_uri(), &runtime);
    assert_eq!(
        producer.endpoint().selector(),
        &OperationSelector::Signal {
            activity_id: "anActivityId".to_string()
        }
    );
}

#[test]
fn producer_without_selector_is_rejected() {
    let runtime = Arc::new(MemoryRuntime::new());
    let err = MessageProducer::from_uri(&camunda_bpm_uri("message"), runtime)
        .err()
        .expect("should reject endpoint");
    assert!(matches!(err, DispatchError::Configuration { .. }));
}

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signal_called() {
    let runtime = Arc::new(MemoryRuntime::new());
    let instance = runtime.start_instance(None).await;
    let execution = runtime
        .add_activity_execution(&instance.id, "anActivityId")
        .await;

    let exchange = Exchange::new()
        .with_property(CAMUNDA_BPM_PROCESS_INSTANCE_ID, instance.id.as_str())
        .with_body(json!({"approved": true}));

    let outcome = producer(&signal_uri(), &runtime)
        .process(&exchange)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DispatchOutcome::Signalled {
            execution_id: execution.id.clone()
        }
    );
    let actions = runtime.actions().await;
    assert_eq!(actions.len(), 1);
    assert_eq!(
        actions[0],
        RuntimeCall::Signal {
            execution_id: execution.id,
            variables: exchange.variables(),
        }
    );
}

#[tokio::test]
async fn signal_transform_business_key() {
    let runtime = Arc::new(MemoryRuntime::new());
    let instance = runtime.start_instance(Some("theBusinessKey")).await;
    runtime
        .add_activity_execution(&instance.id, "anActivityId")
        .await;

    let exchange = Exchange::new().with_property(CAMUNDA_BPM_BUSINESS_KEY, "theBusinessKey");
    producer(&signal_uri(), &runtime)
        .process(&exchange)
        .await
        .unwrap();

    let calls = runtime.calls().await;
    assert_eq!(
        calls[0],
        RuntimeCall::FindProcessInstanceByBusinessKey {
            business_key: "theBusinessKey".to_string()
        }
    );
    assert_eq!(
        calls[1],
        RuntimeCall::FindExecution(ExecutionQuery::waiting_at_activity(
            &instance.id,
            "anActivityId"
        ))
    );
    assert!(matches!(calls[2], RuntimeCall::Signal { .. }));
}

#[tokio::test]
async fn signal_without_waiting_execution_is_not_found() {
    let runtime = Arc::new(MemoryRuntime::new());
    let instance = runtime.start_instance(None).await;

    let exchange =
        Exchange::new().with_property(CAMUNDA_BPM_PROCESS_INSTANCE_ID, instance.id.as_str());
    let err = producer(&signal_uri(), &runtime)
        .process(&exchange)
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::NotFound { .. }));
    assert!(runtime.actions().await.is_empty());
}

#[tokio::test]
async fn signal_without_identifier_is_missing_identifier() {
    let runtime = Arc::new(MemoryRuntime::new());
    let err = producer(&signal_uri(), &runtime)
        .process(&Exchange::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::MissingIdentifier { .. }));
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn message_process_instance_id() {
    let runtime = Arc::new(MemoryRuntime::new());
    let instance = runtime.start_instance(None).await;
    let execution = runtime
        .add_message_subscription(&instance.id, "aMessageName")
        .await;

    let exchange =
        Exchange::new().with_property(CAMUNDA_BPM_PROCESS_INSTANCE_ID, instance.id.as_str());
    let outcome = producer(&message_uri(), &runtime)
        .process(&exchange)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DispatchOutcome::MessageDelivered {
            execution_id: execution.id.clone()
        }
    );
    let calls = runtime.calls().await;
    assert_eq!(
        calls[0],
        RuntimeCall::FindExecution(ExecutionQuery::subscribed_to_message(
            &instance.id,
            "aMessageName"
        ))
    );
    assert!(matches!(
        &calls[1],
        RuntimeCall::DeliverMessageToExecution { message_name, execution_id, .. }
            if message_name == "aMessageName" && *execution_id == execution.id
    ));
}

#[tokio::test]
async fn message_business_key() {
    let runtime = Arc::new(MemoryRuntime::new());
    let exchange = Exchange::new().with_property(CAMUNDA_BPM_BUSINESS_KEY, "theBusinessKey");

    producer(&message_uri(), &runtime)
        .process(&exchange)
        .await
        .unwrap();

    let (business_key, size, _) = only_correlation(&runtime).await;
    assert_eq!(business_key.as_deref(), Some("theBusinessKey"));
    assert_eq!(size, 0);
}

#[tokio::test]
async fn message_business_key_correlation_key() {
    let runtime = Arc::new(MemoryRuntime::new());
    let exchange = Exchange::new()
        .with_property(CAMUNDA_BPM_BUSINESS_KEY, "theBusinessKey")
        .with_property(CAMUNDA_BPM_CORRELATION_KEY, "theCorrelationKey");

    producer(&message_with_correlation_uri(), &runtime)
        .process(&exchange)
        .await
        .unwrap();

    let (business_key, size, value) = only_correlation(&runtime).await;
    assert_eq!(business_key.as_deref(), Some("theBusinessKey"));
    assert_eq!(size, 1);
    assert_eq!(value, Some(json!("theCorrelationKey")));
}

#[tokio::test]
async fn message_no_key() {
    let runtime = Arc::new(MemoryRuntime::new());

    let outcome = producer(&message_uri(), &runtime)
        .process(&Exchange::new())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DispatchOutcome::MessageCorrelated {
            business_key: None,
            correlation_keys: 0
        }
    );
    let (business_key, size, _) = only_correlation(&runtime).await;
    assert!(business_key.is_none());
    assert_eq!(size, 0);
}

#[tokio::test]
async fn message_correlation_key() {
    let runtime = Arc::new(MemoryRuntime::new());
    let exchange = Exchange::new().with_property(CAMUNDA_BPM_CORRELATION_KEY, "theCorrelationKey");

    producer(&message_with_correlation_uri(), &runtime)
        .process(&exchange)
        .await
        .unwrap();

    let (business_key, size, value) = only_correlation(&runtime).await;
    assert!(business_key.is_none());
    assert_eq!(size, 1);
    assert_eq!(value, Some(json!("theCorrelationKey")));
}

#[tokio::test]
async fn message_body_is_passed_as_variables() {
    let runtime = Arc::new(MemoryRuntime::new());
    let exchange = Exchange::new().with_body("plain text");

    producer(&message_uri(), &runtime)
        .process(&exchange)
        .await
        .unwrap();

    match &runtime.calls().await[0] {
        RuntimeCall::CorrelateMessage { variables, .. } => {
            assert_eq!(variables.get("camelBody"), Some(&json!("plain text")));
        }
        other => panic!("expected CorrelateMessage, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_dispatches_do_not_interact() {
    let runtime = Arc::new(MemoryRuntime::new());
    let producer = Arc::new(producer(&message_with_correlation_uri(), &runtime));

    let mut handles = Vec::new();
    for i in 0..16 {
        let producer = producer.clone();
        handles.push(tokio::spawn(async move {
            let exchange = Exchange::new()
                .with_property(CAMUNDA_BPM_CORRELATION_KEY, format!("key-{i}"));
            producer.process(&exchange).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let calls = runtime.calls().await;
    assert_eq!(calls.len(), 16);
    for call in calls {
        match call {
            RuntimeCall::CorrelateMessage {
                correlation_keys, ..
            } => assert_eq!(correlation_keys.len(), 1),
            other => panic!("expected CorrelateMessage, got {other:?}"),
        }
    }
}
