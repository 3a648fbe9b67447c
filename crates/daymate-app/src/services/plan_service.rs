//! Plan backend: async plan generation.
//! Network work runs on the tokio runtime; results are sent via mpsc.

use std::sync::Arc;

use daymate_api::{ApiError, DayMateClient, PlanEnvelope, PlanRequest};
use tokio::sync::mpsc::UnboundedSender;

use super::ServiceMessage;

/// Error type for plan generation
#[derive(Debug, thiserror::Error)]
pub enum PlanGenError {
    #[error("Plan request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Plan service not initialized")]
    NotInitialized,
}

/// Messages sent from plan tasks back to the model
#[derive(Debug)]
pub enum PlanServiceMessage {
    /// Result of generating a plan for `location_id`
    GenerateDone {
        location_id: String,
        epoch: u64,
        result: Result<PlanEnvelope, PlanGenError>,
    },
}

/// Request a plan for one location asynchronously.
/// Sends exactly one `GenerateDone` on the channel.
pub fn request_generate(
    tx: &UnboundedSender<ServiceMessage>,
    client: Arc<DayMateClient>,
    location_id: String,
    epoch: u64,
    token: Option<String>,
    request: PlanRequest,
) {
    let tx = tx.clone();
    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(r) => r,
        Err(_) => {
            let _ = tx.send(
                PlanServiceMessage::GenerateDone {
                    location_id,
                    epoch,
                    result: Err(PlanGenError::NotInitialized),
                }
                .into(),
            );
            return;
        }
    };

    runtime.spawn(async move {
        let result = client
            .generate_plan(token.as_deref(), &request)
            .await
            .map_err(PlanGenError::from);
        if let Err(e) = &result {
            tracing::error!("Plan generation for {} failed: {}", location_id, e);
        }
        let _ = tx.send(
            PlanServiceMessage::GenerateDone {
                location_id,
                epoch,
                result,
            }
            .into(),
        );
    });
}
