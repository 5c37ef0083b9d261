pub mod guild;
pub mod interaction;

pub use guild::{handle_member_add, handle_ready};
pub use interaction::handle_interaction;
