//! Derives session state from the message log.

use francie_core::{ChatMessage, MessageStore, Role, StorageError, StoredMessage};
use serde::Serialize;

/// Where a session stands relative to its turn budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ConversationState {
    Active { turn: u32 },
    Concluded { turn: u32 },
}

impl ConversationState {
    #[must_use]
    pub const fn from_turn(turn: u32, max_turns: u32) -> Self {
        if turn >= max_turns {
            Self::Concluded { turn }
        } else {
            Self::Active { turn }
        }
    }

    #[must_use]
    pub const fn turn(self) -> u32 {
        match self {
            Self::Active { turn } | Self::Concluded { turn } => turn,
        }
    }

    #[must_use]
    pub const fn is_concluded(self) -> bool {
        matches!(self, Self::Concluded { .. })
    }
}

/// Read-only view over a [`MessageStore`].
pub struct SessionStateResolver<S> {
    store: S,
}

impl<S: MessageStore> SessionStateResolver<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The store this resolver reads from.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Highest recorded turn; 0 for a session with no messages.
    pub async fn current_turn(&self, session_id: &str) -> Result<u32, StorageError> {
        self.store.max_turn(session_id).await
    }

    pub async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, StorageError> {
        self.store.history(session_id).await
    }

    pub async fn transcript(&self, session_id: &str) -> Result<Vec<StoredMessage>, StorageError> {
        self.store.messages(session_id).await
    }

    pub async fn state(
        &self,
        session_id: &str,
        max_turns: u32,
    ) -> Result<ConversationState, StorageError> {
        let turn = self.current_turn(session_id).await?;
        Ok(ConversationState::from_turn(turn, max_turns))
    }

    /// The trailing learner message of a turn that never got a reply.
    pub async fn unanswered_message(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredMessage>, StorageError> {
        let last = self.store.messages(session_id).await?.pop();
        Ok(last.filter(|m| m.role == Role::Learner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_from_turn() {
        assert_eq!(
            ConversationState::from_turn(0, 10),
            ConversationState::Active { turn: 0 }
        );
        assert_eq!(
            ConversationState::from_turn(9, 10),
            ConversationState::Active { turn: 9 }
        );
        assert!(ConversationState::from_turn(10, 10).is_concluded());
        assert_eq!(ConversationState::from_turn(12, 10).turn(), 12);
    }
}
