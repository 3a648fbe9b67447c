//! Backend client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        /// `detail` field of a FastAPI error body, when present.
        detail: Option<String>,
    },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Backend-provided explanation, if the server sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the request gave up waiting on the backend.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// True when the server refused the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Build a status error from a response body, extracting FastAPI's `detail`.
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").cloned())
            .map(|d| match d {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });

        let message = match &detail {
            Some(d) => d.clone(),
            None if body.is_empty() => "empty response body".to_string(),
            None => body.chars().take(200).collect(),
        };

        Self::Status {
            status,
            message,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string_extracted() {
        let err = ApiError::from_body(400, r#"{"detail":"Email already registered"}"#);
        assert_eq!(err.detail(), Some("Email already registered"));
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("Email already registered"));
    }

    #[test]
    fn test_structured_detail_is_stringified() {
        let err = ApiError::from_body(422, r#"{"detail":[{"loc":["body","lat"]}]}"#);
        assert!(err.detail().unwrap_or_default().contains("lat"));
    }

    #[test]
    fn test_plain_body_has_no_detail() {
        let err = ApiError::from_body(502, "Bad Gateway");
        assert!(err.detail().is_none());
        assert!(err.to_string().contains("Bad Gateway"));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_unauthorized() {
        assert!(ApiError::from_body(401, "").is_unauthorized());
    }
}
