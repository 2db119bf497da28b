//! bpmn-dispatch: route exchanges to a BPMN engine as signals or messages.
//!
//! See [`message_dispatch`] for the dispatch policy and [`error`] for how
//! failures are classified.

pub mod error;
pub mod message_dispatch;
pub mod telemetry;

pub use error::{DispatchError, LookupTarget, Result};
pub use message_dispatch::{
    DispatchOutcome, DispatchRequest, EndpointConfig, Exchange, MessageDispatchResolver,
    MessageProducer, RuntimeService,
};
