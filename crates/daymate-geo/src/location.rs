//! Device location lookup.
//!
//! A lookup yields either coordinates or an error, never both, and is never
//! retried automatically. A missing capability is reported through the same
//! error channel as a failed lookup.

use std::time::Duration;

use daymate_core::{GeolocationConfig, GeolocationMode, LocationError};
use reqwest::Client;
use serde::Deserialize;

use crate::types::Coords;

const LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Source of the device's current position.
#[derive(Debug, Clone)]
pub enum Geolocator {
    /// Coordinates pinned in configuration.
    Fixed(Coords),

    /// Position estimated from the public IP address.
    IpLookup { client: Client, url: String },

    /// No geolocation capability.
    Disabled,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, alias = "latitude")]
    lat: Option<f64>,
    #[serde(default, alias = "longitude")]
    lon: Option<f64>,
}

impl Geolocator {
    /// Build the locator described by configuration.
    pub fn from_config(config: &GeolocationConfig) -> Self {
        match config.mode {
            GeolocationMode::Fixed => match (config.lat, config.lon) {
                (Some(lat), Some(lon)) => Self::Fixed(Coords::new(lat, lon)),
                _ => {
                    tracing::warn!("Fixed geolocation without coordinates; disabling");
                    Self::Disabled
                }
            },
            GeolocationMode::Ip => Self::ip_lookup(&config.ip_lookup_url),
            GeolocationMode::Disabled => Self::Disabled,
        }
    }

    pub fn ip_lookup(url: &str) -> Self {
        match Client::builder()
            .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()
        {
            Ok(client) => Self::IpLookup {
                client,
                url: url.to_string(),
            },
            Err(e) => {
                tracing::warn!("Failed to create geolocation client: {}", e);
                Self::Disabled
            }
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Request the current position once.
    pub async fn locate(&self) -> Result<Coords, LocationError> {
        let coords = match self {
            Self::Fixed(coords) => *coords,
            Self::Disabled => return Err(LocationError::Unsupported),
            Self::IpLookup { client, url } => Self::lookup(client, url).await?,
        };

        if !coords.is_valid() {
            return Err(LocationError::Lookup(format!(
                "coordinates out of range: {}",
                coords
            )));
        }

        tracing::info!("Got location: {}", coords);
        Ok(coords)
    }

    async fn lookup(client: &Client, url: &str) -> Result<Coords, LocationError> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LocationError::Lookup(format!(
                "lookup returned status {}",
                response.status()
            )));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        if body.status.as_deref() == Some("fail") {
            return Err(LocationError::Lookup(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coords::new(lat, lon)),
            _ => Err(LocationError::Lookup("response had no coordinates".to_string())),
        }
    }
}
