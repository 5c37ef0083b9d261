pub mod pending_store;
pub mod verification_manager;

pub use verification_manager::{create_shared_verification_manager, SharedVerificationManager};
