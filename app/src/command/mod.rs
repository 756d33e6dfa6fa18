//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use francie_config::Config;
use francie_conversation::{TurnOrchestrator, TurnPolicy};
use francie_core::{CompletionGateway, MessageStore};
use francie_providers::{ProviderOptions, build_gateway};
use francie_store::DatabaseMessageStore;
use tracing::info;

mod chat;
mod info;
mod init;
mod serve;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Components shared by commands that take turns.
pub struct CommonComponents {
    pub config: Config,
    pub orchestrator: TurnOrchestrator,
}

/// Directory that relative paths in the config file are resolved against.
fn config_base_dir(config_path: &Path) -> Option<&Path> {
    if config_path.exists() {
        config_path.parent()
    } else {
        None
    }
}

pub fn provider_options(config: &Config) -> ProviderOptions {
    ProviderOptions {
        model: config.provider.model.clone(),
        base_url: config.provider.base_url.clone(),
        temperature: config.provider.temperature,
        timeout: Duration::from_secs(config.provider.timeout_secs),
        ..ProviderOptions::new(
            config.provider.name.clone(),
            config.provider.api_key.clone(),
        )
    }
}

/// Load config, open the store, and build the orchestrator.
pub async fn init_common_components(config_path: Option<PathBuf>) -> anyhow::Result<CommonComponents> {
    let config_path = Config::resolve_path(config_path.as_deref())?;
    let config = Config::load(Some(&config_path))?;

    let instruction = config
        .conversation
        .instruction_prompt(config_base_dir(&config_path))?;
    let policy = TurnPolicy::new(instruction)?
        .with_max_turns(config.conversation.max_turns)?
        .with_closing_message(config.conversation.closing_message.clone())
        .with_replay_unanswered_turns(config.conversation.replay_unanswered_turns);

    let gateway: Arc<dyn CompletionGateway> = build_gateway(&provider_options(&config))?;

    info!("Opening message store");
    let store: Arc<dyn MessageStore> =
        Arc::new(DatabaseMessageStore::connect(&config.database.url).await?);

    let orchestrator = TurnOrchestrator::new(gateway, store, policy);

    Ok(CommonComponents {
        config,
        orchestrator,
    })
}
