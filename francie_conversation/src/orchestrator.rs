//! The turn state machine.
//!
//! `TurnOrchestrator` is the only writer of the message log. One call to
//! [`TurnOrchestrator::take_turn`] either returns the closing message for a
//! concluded session or records one learner message and one tutor reply
//! under the next turn number.

use std::sync::Arc;

use francie_core::{
    CompletionGateway, GatewayError, InstructionPrompt, MessageStore, Role, StorageError,
    StoredMessage, estimate_level,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::locks::SessionLocks;
use crate::resolver::{ConversationState, SessionStateResolver};

pub const DEFAULT_MAX_TURNS: u32 = 10;
pub const DEFAULT_CLOSING_MESSAGE: &str = "Merci pour cette conversation ! À bientôt !";

/// Errors that can occur while taking a turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid conversation policy: {0}")]
    InvalidPolicy(String),
}

/// Budget and wording of a conversation.
#[derive(Debug, Clone)]
pub struct TurnPolicy {
    pub max_turns: u32,
    pub closing_message: String,
    pub instruction: InstructionPrompt,
    /// Reuse an unanswered turn when its learner text is sent again,
    /// instead of recording the text a second time under a new turn.
    pub replay_unanswered_turns: bool,
}

impl TurnPolicy {
    pub fn new(instruction: InstructionPrompt) -> Result<Self, TurnError> {
        if instruction.is_blank() {
            return Err(TurnError::InvalidPolicy(
                "instruction prompt must not be empty".to_string(),
            ));
        }
        Ok(Self {
            max_turns: DEFAULT_MAX_TURNS,
            closing_message: DEFAULT_CLOSING_MESSAGE.to_string(),
            instruction,
            replay_unanswered_turns: false,
        })
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Result<Self, TurnError> {
        if max_turns == 0 {
            return Err(TurnError::InvalidPolicy(
                "max_turns must be at least 1".to_string(),
            ));
        }
        self.max_turns = max_turns;
        Ok(self)
    }

    #[must_use]
    pub fn with_closing_message(mut self, message: impl Into<String>) -> Self {
        self.closing_message = message.into();
        self
    }

    #[must_use]
    pub const fn with_replay_unanswered_turns(mut self, enabled: bool) -> Self {
        self.replay_unanswered_turns = enabled;
        self
    }
}

/// Outcome of one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReply {
    pub reply: String,
    pub turn: u32,
    pub done: bool,
}

pub struct TurnOrchestrator<G = Arc<dyn CompletionGateway>, S = Arc<dyn MessageStore>>
where
    G: Send + Sync,
    S: Send + Sync,
{
    gateway: G,
    resolver: SessionStateResolver<S>,
    policy: TurnPolicy,
    locks: SessionLocks,
}

impl<G, S> TurnOrchestrator<G, S>
where
    G: CompletionGateway,
    S: MessageStore,
{
    pub fn new(gateway: G, store: S, policy: TurnPolicy) -> Self {
        info!(
            "Creating turn orchestrator: provider={}, max_turns={}",
            gateway.provider_name(),
            policy.max_turns
        );
        Self {
            gateway,
            resolver: SessionStateResolver::new(store),
            policy,
            locks: SessionLocks::new(),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &TurnPolicy {
        &self.policy
    }

    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.gateway.provider_name()
    }

    pub async fn state(&self, session_id: &str) -> Result<ConversationState, TurnError> {
        Ok(self
            .resolver
            .state(session_id, self.policy.max_turns)
            .await?)
    }

    pub async fn transcript(&self, session_id: &str) -> Result<Vec<StoredMessage>, TurnError> {
        Ok(self.resolver.transcript(session_id).await?)
    }

    /// Process one learner utterance for `session_id`.
    ///
    /// A gateway failure leaves the learner message recorded without a
    /// reply; nothing is rolled back. Once the budget is used up the session
    /// stays concluded, even if its final turn was never answered.
    pub async fn take_turn(
        &self,
        session_id: &str,
        learner_text: &str,
    ) -> Result<TurnReply, TurnError> {
        let _guard = self.locks.acquire(session_id).await;

        let current = self.resolver.current_turn(session_id).await?;
        if current >= self.policy.max_turns {
            info!(session_id, turn = current, "Conversation concluded");
            return Ok(TurnReply {
                reply: self.policy.closing_message.clone(),
                turn: current,
                done: true,
            });
        }

        let replayed = self.replayable_turn(session_id, learner_text).await?;
        self.gateway.ensure_configured()?;

        let turn = if let Some(turn) = replayed {
            info!(session_id, turn, "Replaying unanswered turn");
            turn
        } else {
            let turn = current + 1;
            info!(session_id, turn, "Processing turn");
            self.resolver
                .store()
                .append(session_id, turn, Role::Learner, learner_text)
                .await?;
            turn
        };

        let history = self.resolver.history(session_id).await?;
        let level = estimate_level(learner_text);
        debug!(
            session_id,
            turn,
            %level,
            messages = history.len(),
            "Requesting tutor reply"
        );

        let reply = self
            .gateway
            .generate_reply(&history, level, &self.policy.instruction)
            .await
            .inspect_err(|e| warn!(session_id, turn, "Turn failed: {e}"))?;

        self.resolver
            .store()
            .append(session_id, turn, Role::Tutor, &reply)
            .await?;

        let done = turn >= self.policy.max_turns;
        info!(session_id, turn, done, "Turn completed");

        Ok(TurnReply { reply, turn, done })
    }

    async fn replayable_turn(
        &self,
        session_id: &str,
        learner_text: &str,
    ) -> Result<Option<u32>, TurnError> {
        if !self.policy.replay_unanswered_turns {
            return Ok(None);
        }
        Ok(self
            .resolver
            .unanswered_message(session_id)
            .await?
            .filter(|m| m.content == learner_text)
            .map(|m| m.turn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defaults() {
        let policy = TurnPolicy::new(InstructionPrompt::new("Tu es FRANCIE.")).unwrap();
        assert_eq!(policy.max_turns, 10);
        assert_eq!(policy.closing_message, DEFAULT_CLOSING_MESSAGE);
        assert!(!policy.replay_unanswered_turns);
    }

    #[test]
    fn blank_prompt_is_invalid() {
        let err = TurnPolicy::new(InstructionPrompt::new(" ")).unwrap_err();
        assert!(matches!(err, TurnError::InvalidPolicy(_)));
    }

    #[test]
    fn zero_budget_is_invalid() {
        let policy = TurnPolicy::new(InstructionPrompt::new("p")).unwrap();
        assert!(policy.with_max_turns(0).is_err());
    }
}
