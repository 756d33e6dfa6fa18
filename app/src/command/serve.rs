use std::path::PathBuf;

use francie_server::{AppState, serve};
use tracing::info;

use super::init_common_components;

/// Input parameters for the Serve command strategy.
#[derive(Debug, Clone)]
pub struct ServeInput {
    pub config_path: Option<PathBuf>,
    /// Optional bind address override
    pub bind: Option<String>,
}

/// Strategy for running the HTTP API.
#[derive(Debug, Clone, Copy)]
pub struct ServeStrategy;

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components(input.config_path).await?;
        let bind = input.bind.unwrap_or_else(|| common.config.server.bind.clone());

        info!(
            "Starting server: provider={}, max_turns={}",
            common.config.provider.name, common.config.conversation.max_turns
        );

        let state = AppState::new(common.orchestrator, common.config.server.index_path.clone());
        serve(state, &bind).await?;
        Ok(())
    }
}
