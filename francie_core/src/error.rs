use thiserror::Error;

use crate::Role;

/// Failures of the durable message log.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Message already recorded for session {session_id} at turn {turn} ({role})")]
    Conflict {
        session_id: String,
        turn: u32,
        role: Role,
    },

    #[error("Corrupt stored message: {0}")]
    Corrupt(String),
}

impl StorageError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Failures of a completion gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported completion provider: {0}")]
    UnsupportedProvider(String),

    #[error("Upstream error{}: {detail}", status_suffix(.status))]
    Upstream { status: Option<u16>, detail: String },
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl GatewayError {
    pub fn upstream(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_includes_status_when_known() {
        let err = GatewayError::upstream(Some(503), "overloaded");
        assert_eq!(err.to_string(), "Upstream error (status 503): overloaded");

        let err = GatewayError::upstream(None, "timed out");
        assert_eq!(err.to_string(), "Upstream error: timed out");
    }
}
