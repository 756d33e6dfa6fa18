use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use francie_core::{MessageStore, Role, StorageError, StoredMessage};
use tokio::sync::RwLock;

/// Process-local message log. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    sessions: RwLock<HashMap<String, Vec<StoredMessage>>>,
}

impl InMemoryMessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages across all sessions.
    pub async fn total_messages(&self) -> usize {
        self.sessions.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(
        &self,
        session_id: &str,
        turn: u32,
        role: Role,
        content: &str,
    ) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().await;
        let log = sessions.entry(session_id.to_owned()).or_default();

        if log.iter().any(|m| m.turn == turn && m.role == role) {
            return Err(StorageError::Conflict {
                session_id: session_id.to_owned(),
                turn,
                role,
            });
        }

        log.push(StoredMessage {
            session_id: session_id.to_owned(),
            turn,
            role,
            content: content.to_owned(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn max_turn(&self, session_id: &str) -> Result<u32, StorageError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .and_then(|log| log.iter().map(|m| m.turn).max())
            .unwrap_or(0))
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, StorageError> {
        let mut log = self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default();
        // Stable sort keeps write order within a turn.
        log.sort_by_key(|m| m.turn);
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_session_is_empty() {
        let store = InMemoryMessageStore::new();
        assert_eq!(store.max_turn("nobody").await.unwrap(), 0);
        assert!(store.history("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemoryMessageStore::new();
        store.append("a", 1, Role::Learner, "Salut").await.unwrap();
        store.append("a", 1, Role::Tutor, "Bonjour !").await.unwrap();
        store.append("b", 1, Role::Learner, "Coucou").await.unwrap();

        assert_eq!(store.history("a").await.unwrap().len(), 2);
        assert_eq!(store.history("b").await.unwrap().len(), 1);
        assert_eq!(store.total_messages().await, 3);
    }

    #[tokio::test]
    async fn duplicate_turn_and_role_is_a_conflict() {
        let store = InMemoryMessageStore::new();
        store.append("a", 1, Role::Learner, "Salut").await.unwrap();

        let err = store
            .append("a", 1, Role::Learner, "Salut encore")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict { turn: 1, .. }));
        assert_eq!(store.total_messages().await, 1);
    }
}
