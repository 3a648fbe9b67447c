//! Weather + news backend: fetches both snapshots for one location.
//! Network work runs on the tokio runtime; results are sent via mpsc.

use std::sync::Arc;

use daymate_api::{ApiError, DayMateClient, NewsSnapshot, WeatherSnapshot};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::ServiceMessage;

/// Error type for weather/news fetches
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("{which} request failed: {source}")]
    Api {
        which: &'static str,
        #[source]
        source: ApiError,
    },

    /// Superseded by a newer fetch before it completed.
    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Data service not initialized")]
    NotInitialized,
}

/// Messages sent from fetch tasks back to the model
#[derive(Debug)]
pub enum DataServiceMessage {
    /// Result of fetching weather and news for `location_id`
    FetchDone {
        location_id: String,
        generation: u64,
        result: Result<(WeatherSnapshot, NewsSnapshot), DataError>,
    },
}

/// Parameters of one fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub location_id: String,
    pub generation: u64,
    pub lat: f64,
    pub lon: f64,
    pub token: Option<String>,
    pub cancel: CancellationToken,
}

/// Request weather and news for one location asynchronously.
///
/// Both requests are in flight together and the pair resolves as a unit.
/// Exactly one `FetchDone` is sent per call, including when the fetch is
/// cancelled.
pub fn request_fetch(
    tx: &UnboundedSender<ServiceMessage>,
    client: Arc<DayMateClient>,
    request: FetchRequest,
) {
    let tx = tx.clone();
    let FetchRequest {
        location_id,
        generation,
        lat,
        lon,
        token,
        cancel,
    } = request;

    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(r) => r,
        Err(_) => {
            let _ = tx.send(
                DataServiceMessage::FetchDone {
                    location_id,
                    generation,
                    result: Err(DataError::NotInitialized),
                }
                .into(),
            );
            return;
        }
    };

    runtime.spawn(async move {
        let token = token.as_deref();
        let pair = async {
            tokio::try_join!(
                async {
                    client.weather(lat, lon, token).await.map_err(|source| DataError::Api {
                        which: "weather",
                        source,
                    })
                },
                async {
                    client.news(lat, lon, token).await.map_err(|source| DataError::Api {
                        which: "news",
                        source,
                    })
                },
            )
        };

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(DataError::Cancelled),
            result = pair => result,
        };

        if let Err(e) = &result {
            if !matches!(e, DataError::Cancelled) {
                tracing::warn!("Fetch for {} failed: {}", location_id, e);
            }
        }

        let _ = tx.send(
            DataServiceMessage::FetchDone {
                location_id,
                generation,
                result,
            }
            .into(),
        );
    });
}
