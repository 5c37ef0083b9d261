pub mod custom_id;
pub mod types;

pub use custom_id::{
    decision_custom_id, ControlId, REASON_INPUT_ID, VERIFICATION_MODAL_ID, VERIFY_BUTTON_ID,
};
pub use types::{
    DecisionAction, DecisionOutcome, DecisionState, Justification, PendingVerification,
    PromptStatus, Reply, Submitter, MAX_JUSTIFICATION_CHARS,
};
