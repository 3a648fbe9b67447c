//! Maps backend and service errors to daymate_core::AppError for consistent
//! user-facing messages. One module per source keeps each mapping small.

mod api;
mod data;
mod plan;

pub use api::ApiErrorExt;
