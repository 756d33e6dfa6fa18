#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Domain types and capability traits shared by every francie crate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;
pub mod level;
pub mod prompt;

pub use error::{GatewayError, StorageError};
pub use level::{Level, estimate_level};
pub use prompt::{InstructionPrompt, compose_messages};

/// Who authored a message.
///
/// Serialized with the chat-completions wire names so history can be sent
/// to a provider verbatim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    Learner,
    #[serde(rename = "assistant")]
    Tutor,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Learner => "user",
            Self::Tutor => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::Learner),
            "assistant" => Ok(Self::Tutor),
            _ => Err(StorageError::Corrupt(format!("unknown role: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// One row of the append-only message log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredMessage {
    pub session_id: String,
    pub turn: u32,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredMessage> for ChatMessage {
    fn from(message: StoredMessage) -> Self {
        Self {
            role: message.role,
            content: message.content,
        }
    }
}

/// Durable, append-only log of per-session messages.
///
/// Implementations must commit each `append` before returning and must
/// reject a second message with the same `(session_id, turn, role)`.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(
        &self,
        session_id: &str,
        turn: u32,
        role: Role,
        content: &str,
    ) -> Result<(), StorageError>;

    /// Highest turn recorded for the session, 0 when it has no messages.
    async fn max_turn(&self, session_id: &str) -> Result<u32, StorageError>;

    /// Full log for the session ordered by turn, ties in write order.
    async fn messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, StorageError>;

    async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, StorageError> {
        Ok(self
            .messages(session_id)
            .await?
            .into_iter()
            .map(ChatMessage::from)
            .collect())
    }
}

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn append(
        &self,
        session_id: &str,
        turn: u32,
        role: Role,
        content: &str,
    ) -> Result<(), StorageError> {
        (**self).append(session_id, turn, role, content).await
    }

    async fn max_turn(&self, session_id: &str) -> Result<u32, StorageError> {
        (**self).max_turn(session_id).await
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, StorageError> {
        (**self).messages(session_id).await
    }

    async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, StorageError> {
        (**self).history(session_id).await
    }
}

/// A remote text-generation capability.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Identifier of the backing provider, e.g. `mistral`.
    fn provider_name(&self) -> &str;

    /// Fails with [`GatewayError::Configuration`] when the gateway cannot
    /// possibly succeed, without touching the network.
    fn ensure_configured(&self) -> Result<(), GatewayError>;

    async fn generate_reply(
        &self,
        history: &[ChatMessage],
        level: Level,
        instruction: &InstructionPrompt,
    ) -> Result<String, GatewayError>;
}

#[async_trait]
impl<T: CompletionGateway + ?Sized> CompletionGateway for Arc<T> {
    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn ensure_configured(&self) -> Result<(), GatewayError> {
        (**self).ensure_configured()
    }

    async fn generate_reply(
        &self,
        history: &[ChatMessage],
        level: Level,
        instruction: &InstructionPrompt,
    ) -> Result<String, GatewayError> {
        (**self).generate_reply(history, level, instruction).await
    }
}
