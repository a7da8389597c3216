//! HTTP error types

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Request failed ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        message: Option<String>,
        body: Value,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Refresh response did not contain an access token")]
    MissingToken,
}

impl ApiError {
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return ApiError::Network(e),
        };

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        ApiError::Status {
            status,
            message,
            body,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message the backend put in the error body, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_display_and_accessors() {
        let err = ApiError::Status {
            status: 401,
            message: Some("jwt expired".to_string()),
            body: json!({ "message": "jwt expired" }),
        };
        assert_eq!(err.to_string(), "Request failed (401): jwt expired");
        assert_eq!(err.server_message(), Some("jwt expired"));
        assert!(err.is_unauthorized());

        let err = ApiError::Status {
            status: 500,
            message: None,
            body: Value::Null,
        };
        assert_eq!(err.to_string(), "Request failed (500): no message");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_missing_token_has_no_status() {
        assert_eq!(ApiError::MissingToken.status(), None);
        assert_eq!(ApiError::MissingToken.server_message(), None);
    }
}
