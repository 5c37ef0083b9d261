use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{BotError, Result};
use crate::verification::{DecisionState, PendingVerification};

#[derive(Debug, Clone)]
struct PendingEntry {
    /// Dropped once the request is settled; only the outcome is remembered
    verification: Option<PendingVerification>,
    state: DecisionState,
}

/// In-memory review queue, keyed by the token embedded in the decision buttons.
///
/// A settled entry keeps only its terminal state so repeated clicks can be
/// refused. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct PendingStore {
    entries: DashMap<Uuid, PendingEntry>,
}

impl PendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request and return its token
    pub fn register(&self, verification: PendingVerification) -> Uuid {
        let token = Uuid::new_v4();
        self.entries.insert(
            token,
            PendingEntry {
                verification: Some(verification),
                state: DecisionState::AwaitingDecision,
            },
        );
        debug!("Registered pending verification {}", token);
        token
    }

    /// Drop a request whose review message never reached the moderators
    pub fn discard(&self, token: Uuid) {
        self.entries.remove(&token);
    }

    /// Take exclusive ownership of a request for a decision.
    /// Only one caller can hold a request at a time.
    pub fn claim(&self, token: Uuid) -> Result<PendingVerification> {
        match self.entries.entry(token) {
            Entry::Vacant(_) => Err(BotError::UnknownRequest),
            Entry::Occupied(mut entry) => {
                let pending = entry.get_mut();
                match (pending.state, &pending.verification) {
                    (DecisionState::AwaitingDecision, Some(verification)) => {
                        let verification = verification.clone();
                        pending.state = DecisionState::InProgress;
                        Ok(verification)
                    }
                    (DecisionState::AwaitingDecision, None) => Err(BotError::UnknownRequest),
                    (DecisionState::InProgress, _) => Err(BotError::DecisionInProgress),
                    _ => Err(BotError::AlreadyDecided),
                }
            }
        }
    }

    /// Hand a claimed request back, leaving it open for another decision
    pub fn release(&self, token: Uuid) {
        self.set_state(token, DecisionState::AwaitingDecision);
    }

    /// Record the terminal outcome of a claimed request
    pub fn settle(&self, token: Uuid, state: DecisionState) {
        debug_assert!(state.is_terminal());
        if let Some(mut entry) = self.entries.get_mut(&token) {
            entry.state = state;
            entry.verification = None;
        }
    }

    pub fn state(&self, token: Uuid) -> Option<DecisionState> {
        self.entries.get(&token).map(|e| e.state)
    }

    /// Whether the submission itself is still held for this token
    #[cfg(test)]
    pub fn holds_submission(&self, token: Uuid) -> bool {
        self.entries
            .get(&token)
            .map_or(false, |e| e.verification.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn set_state(&self, token: Uuid, state: DecisionState) {
        if let Some(mut entry) = self.entries.get_mut(&token) {
            entry.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::{Justification, Submitter};
    use poise::serenity_prelude::UserId;

    fn pending() -> PendingVerification {
        PendingVerification::new(
            Submitter {
                user_id: UserId::new(10),
                username: "newbie".to_string(),
            },
            Justification::parse("I sing bass").unwrap(),
        )
    }

    #[test]
    fn test_claim_is_exclusive() {
        let store = PendingStore::new();
        let token = store.register(pending());

        let claimed = store.claim(token).unwrap();
        assert_eq!(claimed.user_id(), UserId::new(10));
        assert_eq!(store.state(token), Some(DecisionState::InProgress));

        assert!(matches!(store.claim(token), Err(BotError::DecisionInProgress)));
    }

    #[test]
    fn test_release_reopens_request() {
        let store = PendingStore::new();
        let token = store.register(pending());

        store.claim(token).unwrap();
        store.release(token);

        assert_eq!(store.state(token), Some(DecisionState::AwaitingDecision));
        assert!(store.claim(token).is_ok());
    }

    #[test]
    fn test_settled_request_cannot_be_claimed_again() {
        let store = PendingStore::new();
        let token = store.register(pending());

        store.claim(token).unwrap();
        store.settle(token, DecisionState::Denied);

        assert!(matches!(store.claim(token), Err(BotError::AlreadyDecided)));
        assert_eq!(store.state(token), Some(DecisionState::Denied));
    }

    #[test]
    fn test_settle_drops_submission() {
        let store = PendingStore::new();
        let token = store.register(pending());
        assert!(store.holds_submission(token));

        store.claim(token).unwrap();
        assert!(store.holds_submission(token));
        store.release(token);
        assert!(store.holds_submission(token));

        store.claim(token).unwrap();
        store.settle(token, DecisionState::Closed);

        assert!(!store.holds_submission(token));
        assert_eq!(store.state(token), Some(DecisionState::Closed));
        assert!(matches!(store.claim(token), Err(BotError::AlreadyDecided)));
    }

    #[test]
    fn test_unknown_and_discarded_tokens() {
        let store = PendingStore::new();
        assert!(matches!(store.claim(Uuid::new_v4()), Err(BotError::UnknownRequest)));

        let token = store.register(pending());
        store.discard(token);
        assert_eq!(store.len(), 0);
        assert!(matches!(store.claim(token), Err(BotError::UnknownRequest)));
    }

    #[test]
    fn test_resubmissions_get_separate_tokens() {
        let store = PendingStore::new();
        let first = store.register(pending());
        let second = store.register(pending());

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }
}
