//! Error types for GameZone client operations

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One field-level validation failure reported by the backend (or by a
/// form's local validation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// The `{statusCode, message, fieldErrors}` triple every failure collapses to
/// for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedError {
    pub status_code: u16,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}

/// Failures surfaced by the HTTP client wrapper.
///
/// `Clone` so a single in-flight read can hand the same failure to every
/// caller that joined it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received.
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Non-2xx response.
    #[error("HTTP {status_code}: {message}")]
    Http {
        status_code: u16,
        message: String,
        field_errors: Vec<FieldError>,
    },

    /// 2xx response whose body did not decode.
    #[error("Malformed response (HTTP {status_code}): {reason}")]
    MalformedResponse { status_code: u16, reason: String },

    /// 401 intercepted by the global handler. The session has already been
    /// cleared when a caller sees this.
    #[error("Session expired")]
    AuthExpired,

    /// The request could not be built (bad URL, header value, body).
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status_code,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    /// Build an `Http` error from a non-2xx body.
    ///
    /// Accepts `{message | error, errors: [string | {field, message | defaultMessage}]}`;
    /// anything else falls back to `fallback_message` (usually the reason phrase).
    pub fn from_error_body(status_code: u16, body: &str, fallback_message: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                if fallback_message.is_empty() {
                    format!("Request failed with status {}", status_code)
                } else {
                    fallback_message.to_string()
                }
            });

        let field_errors = parsed
            .as_ref()
            .and_then(|v| v.get("errors"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_field_error).collect())
            .unwrap_or_default();

        Self::Http {
            status_code,
            message,
            field_errors,
        }
    }

    /// HTTP status for this failure; 0 when no response was received.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Http { status_code, .. } | ApiError::MalformedResponse { status_code, .. } => {
                *status_code
            }
            ApiError::AuthExpired => 401,
            ApiError::Network { .. } | ApiError::Timeout { .. } | ApiError::InvalidRequest { .. } => 0,
        }
    }

    /// Network errors, timeouts and 5xx responses. Only these are eligible
    /// for automatic retry, and only on idempotent requests.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network { .. } | ApiError::Timeout { .. } => true,
            ApiError::Http { status_code, .. } => (500..600).contains(status_code),
            _ => false,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired)
    }

    pub fn normalized(&self) -> NormalizedError {
        let field_errors = match self {
            ApiError::Http { field_errors, .. } => field_errors.clone(),
            _ => Vec::new(),
        };
        let message = match self {
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Network { message } => message.clone(),
            other => other.to_string(),
        };
        NormalizedError {
            status_code: self.status_code(),
            message,
            field_errors,
        }
    }
}

fn parse_field_error(value: &Value) -> Option<FieldError> {
    match value {
        Value::String(message) => Some(FieldError::general(message.clone())),
        Value::Object(map) => {
            let message = map
                .get("message")
                .or_else(|| map.get("defaultMessage"))
                .and_then(Value::as_str)?;
            let field = map.get("field").and_then(Value::as_str).map(str::to_string);
            Some(FieldError {
                field,
                message: message.to_string(),
            })
        }
        _ => None,
    }
}

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;
