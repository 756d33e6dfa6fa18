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

//! Completion gateways for OpenAI-compatible chat-completions providers.

use std::sync::Arc;
use std::time::Duration;

use francie_core::{CompletionGateway, GatewayError};
use tracing::info;

mod chat_completions;
mod mistral;
mod zhipu;

pub use chat_completions::ChatCompletionsClient;
pub use mistral::MistralProvider;
pub use zhipu::ZhipuProvider;

/// Upper bound on a single provider round-trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Providers this crate knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Mistral,
    Zhipu,
}

impl std::str::FromStr for ProviderKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mistral" => Ok(Self::Mistral),
            "zhipu" => Ok(Self::Zhipu),
            _ => Err(GatewayError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Everything needed to construct a gateway.
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    pub name: String,
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl ProviderOptions {
    #[must_use]
    pub fn new(name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_key: api_key.into(),
            model: None,
            base_url: None,
            temperature: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Select and construct the gateway named by `options.name`.
///
/// A missing API key is not an error here: the gateway reports it from
/// `ensure_configured` so each turn fails before it has side effects.
pub fn build_gateway(options: &ProviderOptions) -> Result<Arc<dyn CompletionGateway>, GatewayError> {
    let kind: ProviderKind = options.name.parse()?;
    info!("Building completion gateway: {:?}", kind);

    let gateway: Arc<dyn CompletionGateway> = match kind {
        ProviderKind::Mistral => Arc::new(MistralProvider::from_client(MistralProvider::client(
            options,
        )?)),
        ProviderKind::Zhipu => Arc::new(ZhipuProvider::from_client(ZhipuProvider::client(
            options,
        )?)),
    };
    Ok(gateway)
}
