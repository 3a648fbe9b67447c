//! Shared services built from configuration.
//!
//! `AppServices` holds the backend client, the local store and the
//! geolocator. It is constructed once at startup and handed to the model;
//! nothing here is global, so tests build isolated instances against a mock
//! backend and an in-memory store.

use std::sync::Arc;
use std::time::Duration;

use daymate_api::{DayMateClient, RetryPolicy};
use daymate_auth::{AuthSession, LocalStore};
use daymate_core::{AppError, Config, NetworkError};
use daymate_geo::Geolocator;

use crate::models::AppModel;

pub struct AppServices {
    client: Arc<DayMateClient>,
    store: LocalStore,
    geolocator: Geolocator,
    preferences: serde_json::Map<String, serde_json::Value>,
}

impl AppServices {
    /// Build every service described by `config`, persisting to its data dir.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::with_store(config, LocalStore::file(&config.storage.data_dir))
    }

    /// Like [`AppServices::from_config`] with an explicit store.
    pub fn with_store(config: &Config, store: LocalStore) -> Result<Self, AppError> {
        let retry = RetryPolicy::new(
            config.api.retry.max_retries,
            config.api.retry.initial_delay_ms,
            config.api.retry.max_delay_ms,
        );
        let client = DayMateClient::new(
            &config.api.base_url,
            Duration::from_secs(config.api.request_timeout_secs),
        )
        .map_err(|e| AppError::Network(NetworkError::ConnectionFailed(e.to_string())))?
        .with_retry(retry);

        tracing::info!("Using backend at {}", client.base_url());
        tracing::debug!("Local state in {:?}", store);

        Ok(Self {
            client: Arc::new(client),
            store,
            geolocator: Geolocator::from_config(&config.geolocation),
            preferences: config.plan.preferences.clone(),
        })
    }

    pub fn client(&self) -> Arc<DayMateClient> {
        Arc::clone(&self.client)
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn geolocator(&self) -> &Geolocator {
        &self.geolocator
    }

    /// Seed the session. `guest` ignores a persisted token for this run
    /// without deleting it.
    pub fn session(&self, guest: bool) -> AuthSession {
        if guest {
            AuthSession::guest(self.store.clone())
        } else {
            AuthSession::restore(self.store.clone())
        }
    }

    /// Build the model and run its startup sequence.
    pub async fn start_model(&self, guest: bool) -> AppModel {
        let mut model = AppModel::new(self.client(), self.session(guest), self.preferences.clone());
        model.start(&self.geolocator).await;
        model
    }
}
