//! Names shared with the routing layer: URI scheme, endpoint parameters and
//! exchange properties.

/// URI scheme of process-engine endpoints.
pub const CAMUNDA_BPM_SCHEME: &str = "camunda-bpm";

/// The only endpoint operation handled here.
pub const MESSAGE_OPERATION: &str = "message";

// ─── Endpoint parameters ─────────────────────────────────────────────────────

pub const ACTIVITY_ID_PARAMETER: &str = "activityId";
pub const MESSAGE_NAME_PARAMETER: &str = "messageName";
pub const CORRELATION_KEY_NAME_PARAMETER: &str = "correlationKeyName";

// ─── Exchange properties ─────────────────────────────────────────────────────

pub const CAMUNDA_BPM_BUSINESS_KEY: &str = "CamundaBpmBusinessKey";
pub const CAMUNDA_BPM_PROCESS_INSTANCE_ID: &str = "CamundaBpmProcessInstanceId";
pub const CAMUNDA_BPM_CORRELATION_KEY: &str = "CamundaBpmCorrelationKey";

/// Variable name used when the exchange body is not a JSON object.
pub const CAMEL_BODY_VARIABLE: &str = "camelBody";

/// Build an endpoint URI, e.g. `camunda_bpm_uri("message?messageName=x")`.
pub fn camunda_bpm_uri(path: &str) -> String {
    format!("{}:{}", CAMUNDA_BPM_SCHEME, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camunda_bpm_uri() {
        assert_eq!(
            camunda_bpm_uri("message?activityId=anActivityId"),
            "camunda-bpm:message?activityId=anActivityId"
        );
    }
}
