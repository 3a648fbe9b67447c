pub mod session;
pub mod storage;

pub use session::AuthSession;
pub use storage::{LocalStore, GUEST_LOCATIONS_KEY, TOKEN_KEY};
