use daymate_api::ApiError;
use daymate_core::{AuthError, NetworkError};

/// Classify backend client errors into the core taxonomy.
pub trait ApiErrorExt {
    fn into_network_error(self) -> NetworkError;

    /// Login/register failures keep the backend `detail` for the notice.
    fn into_auth_error(self) -> AuthError;
}

impl ApiErrorExt for ApiError {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            return NetworkError::Timeout;
        }
        match self {
            ApiError::Status {
                status, message, ..
            } => NetworkError::ServerError { status, message },
            ApiError::Decode(s) => NetworkError::InvalidResponse(s),
            // A status carried by reqwest itself still reads as a server reply
            ApiError::Transport(e) => match e.status() {
                Some(status) => NetworkError::ServerError {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => NetworkError::ConnectionFailed(e.to_string()),
            },
            ApiError::InvalidUrl(s) => NetworkError::ConnectionFailed(s),
        }
    }

    fn into_auth_error(self) -> AuthError {
        match self.detail() {
            Some(detail) => AuthError::Rejected(detail.to_string()),
            None => AuthError::RequestFailed(self.to_string()),
        }
    }
}
