pub mod app;
pub mod config;
pub mod error;
pub mod view_state;

pub use app::App;
pub use config::{
    ApiConfig, Config, GeolocationConfig, GeolocationMode, PlanConfig, RetrySettings,
    StorageConfig, ValidationResult,
};
pub use error::{
    AppError, AuthError, ConfigError, DataError, LocationError, NetworkError, PlanError,
    StorageError,
};
pub use view_state::{Screen, View};

use anyhow::Result;

/// Initialize logging for the client.
///
/// Logs go to stderr so they never interleave with rendered screens on stdout.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("DayMate core initialized");
    Ok(())
}
