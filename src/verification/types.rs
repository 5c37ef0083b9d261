use chrono::{DateTime, Utc};
use poise::serenity_prelude::{Mentionable, MessageId, UserId};

use crate::error::{BotError, Result};

/// Maximum length of the justification text, in characters
pub const MAX_JUSTIFICATION_CHARS: usize = 500;

/// The member who filled in the verification form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    pub user_id: UserId,
    pub username: String,
}

impl Submitter {
    pub fn mention(&self) -> String {
        self.user_id.mention().to_string()
    }
}

/// Free-text reason given by a new member, validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Justification(String);

impl Justification {
    pub fn parse(raw: &str) -> Result<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(BotError::InvalidJustification {
                message: "the reason must not be empty".to_string(),
            });
        }
        let length = text.chars().count();
        if length > MAX_JUSTIFICATION_CHARS {
            return Err(BotError::InvalidJustification {
                message: format!(
                    "the reason is {} characters long, the limit is {}",
                    length, MAX_JUSTIFICATION_CHARS
                ),
            });
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A submitted request waiting for a moderator
#[derive(Debug, Clone)]
pub struct PendingVerification {
    pub submitter: Submitter,
    pub justification: Justification,
    pub submitted_at: DateTime<Utc>,
}

impl PendingVerification {
    pub fn new(submitter: Submitter, justification: Justification) -> Self {
        Self {
            submitter,
            justification,
            submitted_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.submitter.user_id
    }
}

/// Which decision button was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Approve,
    Deny,
}

/// Lifecycle of a pending verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionState {
    AwaitingDecision,
    InProgress,
    Approved,
    Denied,
    /// Decision attempted but the member could not be approved or denied
    /// (left the server, or the bot was refused the kick)
    Closed,
}

impl DecisionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DecisionState::Approved | DecisionState::Denied | DecisionState::Closed
        )
    }
}

/// Response shown to whoever triggered an interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Only visible to the triggering user
    pub ephemeral: bool,
}

impl Reply {
    pub fn private(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }

    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }
}

impl From<BotError> for Reply {
    fn from(err: BotError) -> Self {
        Reply::private(err.to_string())
    }
}

/// Result of a moderator decision: what to tell the moderator,
/// and whether the Approve/Deny buttons must be disabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub reply: Reply,
    pub disable_controls: bool,
}

/// Result of posting the persistent verification prompt on startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStatus {
    NotConfigured,
    ChannelMissing,
    AlreadyPresent,
    Posted(MessageId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_justification_bounds() {
        assert!(Justification::parse("").is_err());
        assert!(Justification::parse("   \n ").is_err());
        assert!(Justification::parse("a").is_ok());
        assert!(Justification::parse(&"x".repeat(MAX_JUSTIFICATION_CHARS)).is_ok());
        assert!(Justification::parse(&"x".repeat(MAX_JUSTIFICATION_CHARS + 1)).is_err());
    }

    #[test]
    fn test_justification_counts_characters_not_bytes() {
        // 500 two-byte characters
        let text = "é".repeat(MAX_JUSTIFICATION_CHARS);
        let parsed = Justification::parse(&text).unwrap();
        assert_eq!(parsed.as_str().chars().count(), MAX_JUSTIFICATION_CHARS);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!DecisionState::AwaitingDecision.is_terminal());
        assert!(!DecisionState::InProgress.is_terminal());
        assert!(DecisionState::Approved.is_terminal());
        assert!(DecisionState::Denied.is_terminal());
        assert!(DecisionState::Closed.is_terminal());
    }

    #[test]
    fn test_submitter_mention() {
        let submitter = Submitter {
            user_id: UserId::new(1234),
            username: "newbie".to_string(),
        };
        assert_eq!(submitter.mention(), "<@1234>");
    }
}
