use crate::services::plan_service::PlanGenError;
use daymate_core::{AppError, PlanError};

impl From<PlanGenError> for AppError {
    fn from(e: PlanGenError) -> Self {
        AppError::Plan(PlanError::GenerationFailed(e.to_string()))
    }
}
