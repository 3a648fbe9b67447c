//! Typed async client for the DayMate backend: auth, saved locations,
//! weather and news snapshots, plan generation and plan history.

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::DayMateClient;
pub use error::ApiError;
pub use retry::RetryPolicy;
pub use types::*;
