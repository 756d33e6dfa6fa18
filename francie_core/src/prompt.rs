//! Instruction prompt handling and request assembly.

use serde::{Deserialize, Serialize};

use crate::{ChatMessage, Level, Role};

/// Default label placed in front of the level tag.
pub const DEFAULT_LEVEL_LABEL: &str = "Niveau";

/// The pedagogical system prompt, supplied by configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstructionPrompt {
    pub text: String,
    pub level_label: String,
}

impl InstructionPrompt {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level_label: DEFAULT_LEVEL_LABEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_level_label(mut self, label: impl Into<String>) -> Self {
        self.level_label = label.into();
        self
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// The prompt text followed by a `label: tag` line for `level`.
    #[must_use]
    pub fn annotated(&self, level: Level) -> String {
        format!("{}\n{}: {}", self.text, self.level_label, level.cefr())
    }
}

/// Build the provider message list: annotated system prompt, then history.
#[must_use]
pub fn compose_messages(
    instruction: &InstructionPrompt,
    level: Level,
    history: &[ChatMessage],
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::new(Role::System, instruction.annotated(level)));
    messages.extend_from_slice(history);
    messages
}
