//! Error type shared by every API call.

use std::fmt;

use serde_json::Value;

/// Category of an API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The server could not be reached (DNS, connect, timeout, broken body)
    Network,
    /// 401 that survived the refresh-and-retry path
    Unauthorized,
    /// 403: valid session, insufficient role
    Forbidden,
    /// 400 with field-level errors
    Validation,
    /// 404
    NotFound,
    /// 5xx
    Server,
    /// Any other non-success status
    Status,
    /// The response body did not have the expected shape
    Decode,
    /// Token refresh failed; the stored session was torn down
    SessionExpired,
    /// Rejected locally before any request was sent
    InvalidRequest,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::Unauthorized => write!(f, "unauthorized"),
            ApiErrorKind::Forbidden => write!(f, "forbidden"),
            ApiErrorKind::Validation => write!(f, "validation"),
            ApiErrorKind::NotFound => write!(f, "not_found"),
            ApiErrorKind::Server => write!(f, "server"),
            ApiErrorKind::Status => write!(f, "http_status"),
            ApiErrorKind::Decode => write!(f, "decode"),
            ApiErrorKind::SessionExpired => write!(f, "session_expired"),
            ApiErrorKind::InvalidRequest => write!(f, "invalid_request"),
        }
    }
}

/// Structured API error with the parsed server payload when there is one.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// One-line summary suitable for display
    pub message: String,
    /// Parsed JSON error body, if the server sent one
    pub payload: Option<Value>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            payload: None,
        }
    }

    /// Builds an error from a non-success status and its raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            400 => ApiErrorKind::Validation,
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            500..=599 => ApiErrorKind::Server,
            _ => ApiErrorKind::Status,
        };
        let payload = serde_json::from_str::<Value>(body)
            .ok()
            .filter(|v| !v.is_null());
        let message = payload
            .as_ref()
            .and_then(summarize_payload)
            .unwrap_or_else(|| format!("HTTP {status}"));

        Self {
            kind,
            status: Some(status),
            message,
            payload,
        }
    }

    /// Builds a network error from a transport failure.
    pub fn network(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            "Could not connect to the server".to_string()
        } else {
            format!("Network error: {err}")
        };
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn session_expired(message: impl Into<String>) -> Self {
        Self {
            status: Some(401),
            ..Self::new(ApiErrorKind::SessionExpired, message)
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidRequest, message)
    }

    /// True if this error ended the session (the caller should show login).
    pub fn is_session_fatal(&self) -> bool {
        self.kind == ApiErrorKind::SessionExpired
    }

    /// Field-level validation messages as `(field, message)` pairs.
    ///
    /// Reads the usual `{"field": ["msg", ...]}` and `{"field": "msg"}` shapes.
    pub fn field_errors(&self) -> Vec<(String, String)> {
        let Some(Value::Object(map)) = &self.payload else {
            return Vec::new();
        };
        let mut errors = Vec::new();
        for (field, value) in map {
            if field == "detail" || field == "error" {
                continue;
            }
            match value {
                Value::String(msg) => errors.push((field.clone(), msg.clone())),
                Value::Array(msgs) => errors.extend(
                    msgs.iter()
                        .filter_map(Value::as_str)
                        .map(|msg| (field.clone(), msg.to_string())),
                ),
                _ => {}
            }
        }
        errors
    }
}

/// Picks the most useful line out of an error body: `detail`, then `error`,
/// then the first field error.
fn summarize_payload(payload: &Value) -> Option<String> {
    let map = payload.as_object()?;
    for key in ["detail", "error", "message"] {
        if let Some(msg) = map.get(key).and_then(Value::as_str) {
            return Some(msg.to_string());
        }
    }
    map.iter().find_map(|(field, value)| {
        let msg = match value {
            Value::String(s) => Some(s.as_str()),
            Value::Array(items) => items.first().and_then(Value::as_str),
            _ => None,
        }?;
        Some(format!("{field}: {msg}"))
    })
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
