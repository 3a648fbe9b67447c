use crate::services::data_service::DataError as UiDataError;
use daymate_core::{AppError, DataError};

impl From<UiDataError> for AppError {
    fn from(e: UiDataError) -> Self {
        AppError::Data(DataError::FetchFailed(e.to_string()))
    }
}
