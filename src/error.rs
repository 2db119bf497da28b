//! Error types for message dispatch.
//!
//! Dispatch failures are split by who has to act on them: configuration and
//! missing-identifier errors are fatal for the route, `NotFound` is left to the
//! caller's retry policy, and anything the engine raises passes through as-is.

use thiserror::Error;

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Main error type for the dispatch layer.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No usable operation selector, or the endpoint configuration is invalid.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// Signal mode without a business key or process instance id.
    #[error("Missing identifier: signal for activity '{activity_id}' needs a business key or a process instance id")]
    MissingIdentifier { activity_id: String },

    /// An engine lookup returned no match.
    #[error("Not found: {what}")]
    NotFound { what: LookupTarget },

    /// Raised by the engine collaborator, propagated unchanged.
    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}

impl DispatchError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Only lookup misses are worth retrying; the target may appear later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// What an engine lookup was searching for when it came back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTarget {
    ProcessInstance {
        business_key: String,
    },
    Execution {
        process_instance_id: String,
        activity_id: Option<String>,
        message_name: Option<String>,
    },
}

impl std::fmt::Display for LookupTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProcessInstance { business_key } => {
                write!(f, "process instance with business key '{}'", business_key)
            }
            Self::Execution {
                process_instance_id,
                activity_id,
                message_name,
            } => {
                write!(f, "execution in process instance '{}'", process_instance_id)?;
                if let Some(activity_id) = activity_id {
                    write!(f, " at activity '{}'", activity_id)?;
                }
                if let Some(message_name) = message_name {
                    write!(f, " subscribed to message '{}'", message_name)?;
                }
                Ok(())
            }
        }
    }
}
