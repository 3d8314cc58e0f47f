//! Error mapping and the normalized error shape returned to screens.
//!
//! # Design
//! - One status/code table drives every user-facing error string.
//! - Error bodies are parsed leniently; unknown shapes fall back to generic copy.
//! - Anything without an HTTP response normalizes to the same network message.

use serde_json::Value;
use thiserror::Error;

/// Message used when no HTTP response was received.
pub const NETWORK_ERROR_MESSAGE: &str = "Network or server error";
/// Message queued once when a session token is rejected.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
/// Catch-all for unmapped statuses without a server message.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

enum StatusEntry {
    Flat(&'static str),
    Codes(&'static [(i64, &'static str)]),
}

const ERROR_TABLE: &[(u16, StatusEntry)] = &[
    (
        400,
        StatusEntry::Codes(&[(4_000_019, "User with entered email already exist.")]),
    ),
    (401, StatusEntry::Codes(&[])),
    (
        403,
        StatusEntry::Codes(&[
            (4_030_003, "Invalid credentials provided."),
            (4_030_004, "Wrong email or password."),
            (4_030_010, "Not enough credits."),
        ]),
    ),
    (
        404,
        StatusEntry::Flat("The requested resource could not be found."),
    ),
    (409, StatusEntry::Codes(&[])),
    (
        500,
        StatusEntry::Flat("Internal Server Error: Something went wrong on our end."),
    ),
];

fn lookup(status: u16) -> Option<&'static StatusEntry> {
    ERROR_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == status)
        .map(|(_, entry)| entry)
}

/// Translate an HTTP status and application error code into user-facing copy.
///
/// Resolution order: flat status string, exact code match, non-empty
/// `fallback`, then `"(<status>-<code>) Unknown error occurred."` for mapped
/// statuses or the generic catch-all for everything else.
#[must_use]
pub fn error_message(status: Option<u16>, code: Option<i64>, fallback: &str) -> String {
    match status.and_then(lookup) {
        Some(StatusEntry::Flat(message)) => (*message).to_string(),
        Some(StatusEntry::Codes(codes)) => {
            if let Some((_, message)) = code
                .and_then(|code| codes.iter().find(|(candidate, _)| *candidate == code))
            {
                return (*message).to_string();
            }
            if !fallback.is_empty() {
                return fallback.to_string();
            }
            let status = status.map_or_else(|| "unknown".to_string(), |value| value.to_string());
            let code = code.map_or_else(|| "unknown".to_string(), |value| value.to_string());
            format!("({status}-{code}) Unknown error occurred.")
        }
        None if !fallback.is_empty() => fallback.to_string(),
        None => GENERIC_ERROR_MESSAGE.to_string(),
    }
}

/// Fields of interest extracted from a non-2xx response body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorBody {
    /// Application error code (`errorCode`, else `code`).
    pub error_code: Option<i64>,
    /// Server `message` when it is a plain string.
    pub message: Option<String>,
    /// Server `message` rendered for display (arrays are joined).
    pub detail: Option<String>,
    /// Raw JSON body, when it parsed.
    pub raw: Option<Value>,
}

impl ErrorBody {
    /// Parse an error body, tolerating empty and non-JSON payloads.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Self {
        let Ok(raw) = serde_json::from_slice::<Value>(bytes) else {
            return Self::default();
        };
        let error_code = code_field(&raw, "errorCode").or_else(|| code_field(&raw, "code"));
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let detail = match raw.get("message") {
            Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
            Some(Value::Array(items)) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                (!parts.is_empty()).then(|| parts.join(","))
            }
            _ => None,
        };
        Self {
            error_code,
            message,
            detail,
            raw: Some(raw),
        }
    }

    /// Message used by the global notification path (`"Error"` when absent).
    #[must_use]
    pub fn display_message(&self) -> &str {
        self.detail.as_deref().unwrap_or("Error")
    }
}

fn code_field(raw: &Value, field: &str) -> Option<i64> {
    match raw.get(field)? {
        Value::Number(number) => number.as_i64().filter(|code| *code != 0),
        Value::String(text) => text.trim().parse::<i64>().ok().filter(|code| *code != 0),
        _ => None,
    }
}

/// Failure of a single request through the HTTP client layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(String),
    /// No response was received.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Parsed error body.
        body: ErrorBody,
        /// Whether the response hook already surfaced this failure.
        handled_globally: bool,
    },
    /// A 2xx response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl RequestError {
    /// HTTP status, when a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Encode(_) | Self::Network(_) | Self::Decode(_) => None,
        }
    }

    /// Whether the response hook already notified the user.
    #[must_use]
    pub const fn handled_globally(&self) -> bool {
        matches!(
            self,
            Self::Status {
                handled_globally: true,
                ..
            }
        )
    }
}

/// Normalized error returned by the fetch wrappers.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status (`None` when no response was received).
    pub status: Option<u16>,
    /// Application error code from the body.
    pub error_code: Option<i64>,
    /// User-facing message.
    pub message: String,
    /// Underlying request failure.
    pub original: RequestError,
}

impl ApiError {
    /// Whether the failure carried the given HTTP status.
    #[must_use]
    pub fn is_status(&self, status: u16) -> bool {
        self.status == Some(status)
    }
}

impl From<RequestError> for ApiError {
    fn from(original: RequestError) -> Self {
        match &original {
            RequestError::Status { status, body, .. } => {
                let fallback = body.message.as_deref().unwrap_or_default();
                Self {
                    status: Some(*status),
                    error_code: body.error_code,
                    message: error_message(Some(*status), body.error_code, fallback),
                    original,
                }
            }
            RequestError::Encode(_) | RequestError::Network(_) | RequestError::Decode(_) => Self {
                status: None,
                error_code: None,
                message: NETWORK_ERROR_MESSAGE.to_string(),
                original,
            },
        }
    }
}
