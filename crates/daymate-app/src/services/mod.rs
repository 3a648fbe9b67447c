pub mod data_service;
pub mod plan_service;

pub use data_service::{request_fetch, DataError, DataServiceMessage, FetchRequest};
pub use plan_service::{request_generate, PlanGenError, PlanServiceMessage};

/// Every message a service task can post back to the model.
#[derive(Debug)]
pub enum ServiceMessage {
    Data(DataServiceMessage),
    Plan(PlanServiceMessage),
}

impl From<DataServiceMessage> for ServiceMessage {
    fn from(msg: DataServiceMessage) -> Self {
        Self::Data(msg)
    }
}

impl From<PlanServiceMessage> for ServiceMessage {
    fn from(msg: PlanServiceMessage) -> Self {
        Self::Plan(msg)
    }
}
