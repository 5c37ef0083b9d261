//! Custom ids carried by the bot's buttons and modal.
//!
//! Decision buttons carry the token of the pending verification they act on,
//! so a click can be routed without keeping any per-message state around.

use uuid::Uuid;

use super::types::DecisionAction;

pub const VERIFY_BUTTON_ID: &str = "verify_button";
pub const VERIFICATION_MODAL_ID: &str = "verification_modal";
pub const REASON_INPUT_ID: &str = "verification_reason";

const APPROVE_PREFIX: &str = "approve_verification";
const DENY_PREFIX: &str = "deny_verification";

/// A parsed component custom id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlId {
    VerifyButton,
    Decision { action: DecisionAction, token: Uuid },
}

impl ControlId {
    pub fn parse(custom_id: &str) -> Option<Self> {
        if custom_id == VERIFY_BUTTON_ID {
            return Some(ControlId::VerifyButton);
        }

        let (prefix, token) = custom_id.split_once(':')?;
        let action = match prefix {
            APPROVE_PREFIX => DecisionAction::Approve,
            DENY_PREFIX => DecisionAction::Deny,
            _ => return None,
        };
        let token = Uuid::parse_str(token).ok()?;
        Some(ControlId::Decision { action, token })
    }
}

pub fn decision_custom_id(action: DecisionAction, token: Uuid) -> String {
    let prefix = match action {
        DecisionAction::Approve => APPROVE_PREFIX,
        DecisionAction::Deny => DENY_PREFIX,
    };
    format!("{}:{}", prefix, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decision_ids() {
        let token = Uuid::new_v4();

        let approve = decision_custom_id(DecisionAction::Approve, token);
        assert_eq!(
            ControlId::parse(&approve),
            Some(ControlId::Decision {
                action: DecisionAction::Approve,
                token
            })
        );

        let deny = decision_custom_id(DecisionAction::Deny, token);
        assert!(deny.starts_with("deny_verification:"));
        assert_eq!(
            ControlId::parse(&deny),
            Some(ControlId::Decision {
                action: DecisionAction::Deny,
                token
            })
        );
    }

    #[test]
    fn test_parse_other_ids() {
        assert_eq!(ControlId::parse("verify_button"), Some(ControlId::VerifyButton));
        // Ids from the old static decision view carry no token
        assert_eq!(ControlId::parse("approve_verification"), None);
        assert_eq!(ControlId::parse("approve_verification:not-a-uuid"), None);
        assert_eq!(ControlId::parse("something_else:123"), None);
    }
}
