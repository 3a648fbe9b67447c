//! DayMate client state and presentation.
//!
//! [`AppModel`] is the top-level state holder. Service tasks post results
//! back to it over a channel; [`render`] turns it into text and
//! [`commands`] maps input lines onto its operations.

pub mod app_services;
pub mod commands;
pub mod error_mapping;
pub mod models;
pub mod render;
pub mod services;

pub use app_services::AppServices;
pub use commands::{parse_line, run_line, Command, Outcome};
pub use models::{AppModel, DeleteError, Location, LocationOpError, LocationSource, Notice};
pub use render::{render, render_notices};
