//! Inference error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility; these types carry the context needed to
//! build meaningful log entries.

use thiserror::Error;

/// Errors that can occur during inference operations.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// TCP/HTTP connection to the model endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// The model endpoint did not respond within the configured timeout.
    #[error("inference timeout after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Non-2xx HTTP response from the model endpoint.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Failed to parse a tool call from the model's response.
    #[error("tool call parse error: {reason}")]
    ToolCallParseError { raw_response: String, reason: String },

    /// The response body was not a usable chat completion.
    #[error("invalid model response: {reason}")]
    ResponseError { reason: String },

    /// Configuration loading or validation error.
    #[error("config error: {reason}")]
    ConfigError { reason: String },
}

/// Coarse cause of a failed model call, used by the connection test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    Authentication,
    Endpoint,
    Deployment,
    Other,
}

impl InferenceError {
    /// Extract the error body text, if this is an `HttpError`.
    pub fn error_body(&self) -> Option<&str> {
        match self {
            InferenceError::HttpError { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Classify the failure by status code first, then by message text.
    pub fn cause(&self) -> FailureCause {
        match self {
            InferenceError::HttpError { status: 401 | 403, .. } => FailureCause::Authentication,
            InferenceError::ConnectionFailed { .. } => FailureCause::Endpoint,
            _ => {
                let text = self.to_string().to_lowercase();
                if text.contains("api key") || text.contains("api_key") || text.contains("apikey") {
                    FailureCause::Authentication
                } else if text.contains("deployment") {
                    FailureCause::Deployment
                } else if text.contains("endpoint") || text.contains("base_url") {
                    FailureCause::Endpoint
                } else {
                    FailureCause::Other
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_http_error() {
        let err = InferenceError::HttpError {
            status: 500,
            body: "test body".to_string(),
        };
        assert_eq!(err.error_body(), Some("test body"));
    }

    #[test]
    fn test_error_body_non_http() {
        let err = InferenceError::Timeout { duration_secs: 5 };
        assert!(err.error_body().is_none());
    }

    #[test]
    fn test_cause_authentication() {
        let err = InferenceError::HttpError {
            status: 401,
            body: "Unauthorized".into(),
        };
        assert_eq!(err.cause(), FailureCause::Authentication);

        let err = InferenceError::ConfigError {
            reason: "api_key is not set".into(),
        };
        assert_eq!(err.cause(), FailureCause::Authentication);
    }

    #[test]
    fn test_cause_deployment() {
        let err = InferenceError::HttpError {
            status: 404,
            body: r#"{"error":{"code":"DeploymentNotFound"}}"#.into(),
        };
        assert_eq!(err.cause(), FailureCause::Deployment);
    }

    #[test]
    fn test_cause_endpoint_and_other() {
        let err = InferenceError::ConnectionFailed {
            endpoint: "http://localhost:1".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(err.cause(), FailureCause::Endpoint);

        let err = InferenceError::HttpError {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.cause(), FailureCause::Other);
    }
}
