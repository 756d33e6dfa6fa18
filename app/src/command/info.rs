use std::path::PathBuf;

use francie_config::Config;
use francie_core::CompletionGateway;
use francie_providers::build_gateway;
use francie_store::DatabaseMessageStore;
use tracing::info;

use super::provider_options;

/// Strategy for displaying configuration information.
///
/// Prints the effective configuration (file plus environment overrides)
/// with the API key masked, and checks that the database is reachable.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, config_path: Self::Input) -> anyhow::Result<()> {
        let config_path = Config::resolve_path(config_path.as_deref())?;
        let config = Config::load(Some(&config_path))?;

        println!("=== francie Configuration ===\n");
        println!("Config file: {}", config_path.display());
        println!();

        println!("Provider:");
        println!("  Name: {}", config.provider.name);
        println!("  API Key: {}", mask_secret(&config.provider.api_key));
        if let Some(ref model) = config.provider.model {
            println!("  Model: {model}");
        }
        if let Some(ref base_url) = config.provider.base_url {
            println!("  Base URL: {base_url}");
        }
        println!("  Timeout: {}s", config.provider.timeout_secs);
        match build_gateway(&provider_options(&config)) {
            Ok(gateway) => match gateway.ensure_configured() {
                Ok(()) => println!("  Status: Ready"),
                Err(e) => println!("  Status: {e}"),
            },
            Err(e) => println!("  Status: {e}"),
        }
        println!();

        println!("Database:");
        println!("  URL: {}", mask_database_url(&config.database.url));
        info!("Testing database connection");
        match DatabaseMessageStore::connect(&config.database.url).await {
            Ok(_) => println!("  Status: Connected"),
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e}");
            }
        }
        println!();

        println!("Conversation:");
        println!("  Max Turns: {}", config.conversation.max_turns);
        println!(
            "  Closing Message: {}",
            truncate(&config.conversation.closing_message, 60)
        );
        println!(
            "  Replay Unanswered Turns: {}",
            config.conversation.replay_unanswered_turns
        );
        match config
            .conversation
            .instruction_prompt(config_path.parent().filter(|_| config_path.exists()))
        {
            Ok(prompt) => println!("  Instruction Prompt: {}", truncate(&prompt.text, 60)),
            Err(e) => println!("  Instruction Prompt: {e}"),
        }
        println!();

        println!("Server:");
        println!("  Bind: {}", config.server.bind);
        println!("  Index: {}", config.server.index_path.display());

        Ok(())
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        "(not set)".to_string()
    } else if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

fn mask_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    let Some((credentials, after_at)) = rest.split_once('@') else {
        return url.to_string();
    };

    let Some((username, _password)) = credentials.split_once(':') else {
        return url.to_string();
    };

    format!("{scheme}://{username}:***@{after_at}")
}

fn truncate(s: &str, max_chars: usize) -> String {
    let line = s.lines().next().unwrap_or_default();
    if line.chars().count() <= max_chars && line.len() == s.len() {
        line.to_string()
    } else {
        let head: String = line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
