//! Centralized error types for the DayMate client.
//!
//! Every failure in the client is locally recoverable: nothing here is fatal
//! to the process. Each error carries a `user_message()` that is shown as a
//! notice at the point of the failing action, while the `Display` output keeps
//! the full context for logs.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Returns a user-friendly message suitable for a notice line.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(e) => e.user_message().to_string(),
            AppError::Auth(e) => e.user_message(),
            AppError::Location(e) => e.user_message().to_string(),
            AppError::Data(e) => e.user_message().to_string(),
            AppError::Plan(e) => e.user_message().to_string(),
            AppError::Storage(e) => e.user_message().to_string(),
            AppError::Config(e) => e.user_message().to_string(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Login/register failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend rejected the request and said why (FastAPI `detail`).
    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Authentication request failed: {0}")]
    RequestFailed(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Failed to persist token: {0}")]
    TokenStorage(String),
}

impl AuthError {
    /// Backend-provided detail when available, otherwise a generic message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Rejected(detail) => detail.clone(),
            AuthError::RequestFailed(_) => "Error".to_string(),
            AuthError::NotAuthenticated => "Please log in first.".to_string(),
            AuthError::TokenStorage(_) => "Failed to save your session.".to_string(),
        }
    }
}

/// Geolocation and location-list failures.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Geolocation unsupported")]
    Unsupported,

    #[error("Geolocation failed: {0}")]
    Lookup(String),

    #[error("Failed to load saved locations: {0}")]
    LoadFailed(#[source] NetworkError),

    #[error("Failed to save location: {0}")]
    SaveFailed(#[source] NetworkError),

    #[error("Failed to delete location: {0}")]
    DeleteFailed(#[source] NetworkError),

    #[error("Invalid location input: {0}")]
    InvalidInput(String),

    #[error("Coordinates out of range: {0}")]
    OutOfRange(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::Unsupported => {
                "Geolocation not supported. Please enter location manually."
            }
            LocationError::Lookup(_) => {
                "Could not get geolocation. Enable location or enter manually."
            }
            LocationError::LoadFailed(_) => "Unable to load saved locations.",
            LocationError::SaveFailed(_) => "Unable to save location.",
            LocationError::DeleteFailed(_) => "Unable to delete location.",
            LocationError::InvalidInput(_) => "Latitude and longitude are required.",
            LocationError::OutOfRange(_) => {
                "Latitude must be between -90 and 90 and longitude between -180 and 180."
            }
        }
    }
}

/// Weather/news fetch failures. The pair fails as a unit.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Weather/news fetch failed: {0}")]
    FetchFailed(String),
}

impl DataError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DataError::FetchFailed(_) => "Error fetching weather/news.",
        }
    }
}

/// Plan generation and history failures.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("No location selected")]
    NoLocation,

    #[error("Plan generation failed: {0}")]
    GenerationFailed(String),

    #[error("Plan history failed: {0}")]
    HistoryFailed(#[source] NetworkError),
}

impl PlanError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PlanError::NoLocation => "Select or add a location first.",
            PlanError::GenerationFailed(_) => "Error generating plan",
            PlanError::HistoryFailed(_) => "Failed to fetch plan history.",
        }
    }
}

/// Local persisted state failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {key}: {message}")]
    Read { key: String, message: String },

    #[error("Failed to write {key}: {message}")]
    Write { key: String, message: String },

    #[error("Corrupt value under {key}: {message}")]
    Corrupt { key: String, message: String },
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Read { .. } => "Unable to read local data.",
            StorageError::Write { .. } => "Unable to save local data.",
            StorageError::Corrupt { .. } => "Local data was unreadable and has been reset.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}
