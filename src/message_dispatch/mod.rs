//! Message dispatch onto a BPMN process engine.
//!
//! An endpoint (`camunda-bpm:message?...`) selects the operation, an exchange
//! supplies business key, process instance id, correlation value and body, and
//! the resolver turns the combination into exactly one runtime call:
//!
//! - `activityId` endpoints signal the execution waiting at that activity;
//! - `messageName` endpoints either deliver to the execution subscribed in a
//!   known process instance or let the engine correlate the message.
//!
//! The engine itself sits behind `RuntimeService`; `MemoryRuntime` is the
//! in-process implementation used by tests and the CLI.

pub mod config;
pub mod constants;
pub mod endpoint;
pub mod exchange;
pub mod producer;
pub mod resolver;
pub mod runtime;
pub mod runtime_memory;
pub mod types;

pub use config::{DispatchConfig, EndpointBinding, EndpointConfigIndex};
pub use endpoint::{EndpointConfig, OperationSelector};
pub use exchange::Exchange;
pub use producer::MessageProducer;
pub use resolver::MessageDispatchResolver;
pub use runtime::{ExecutionQuery, RuntimeService};
pub use runtime_memory::{MemoryRuntime, RuntimeCall};
pub use types::{
    CorrelationKey, CorrelationMap, DispatchOutcome, DispatchParams, DispatchRequest,
    ExecutionRef, MessageRequest, MessageTarget, ProcessInstanceRef, ProcessTarget,
    SignalRequest, VariableMap,
};
