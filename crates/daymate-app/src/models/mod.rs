pub mod app_model;
pub mod history;
pub mod location;
pub mod location_store;
pub mod plan_cache;
pub mod remote_data;

pub use app_model::{AppModel, DeleteError, LocationOpError, Notice};
pub use history::PlanHistory;
pub use location::{GuestRecord, Location, LocationSource, CURRENT_ID, CURRENT_LABEL};
pub use location_store::LocationStore;
pub use plan_cache::PlanCache;
pub use remote_data::RemoteData;
