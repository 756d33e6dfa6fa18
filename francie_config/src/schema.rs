use std::path::{Path, PathBuf};

use francie_core::InstructionPrompt;
use francie_core::prompt::DEFAULT_LEVEL_LABEL;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const CONFIG_DIR: &str = "francie";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_bind")]
    pub bind: String,
    /// Static page served at `/`.
    #[serde(default = "ServerConfig::default_index_path")]
    pub index_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            index_path: Self::default_index_path(),
        }
    }
}

impl ServerConfig {
    fn default_bind() -> String {
        "127.0.0.1:8000".to_string()
    }

    fn default_index_path() -> PathBuf {
        PathBuf::from("index.html")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConversationConfig {
    #[serde(default = "ConversationConfig::default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "ConversationConfig::default_closing_message")]
    pub closing_message: String,
    /// Inline instruction prompt; takes precedence over `instruction_prompt_file`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_prompt: Option<String>,
    #[serde(
        default = "ConversationConfig::default_prompt_file",
        skip_serializing_if = "Option::is_none"
    )]
    pub instruction_prompt_file: Option<PathBuf>,
    #[serde(default = "ConversationConfig::default_level_label")]
    pub level_label: String,
    /// Re-run an unanswered learner turn when the same text is resent.
    #[serde(default)]
    pub replay_unanswered_turns: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: Self::default_max_turns(),
            closing_message: Self::default_closing_message(),
            instruction_prompt: None,
            instruction_prompt_file: Self::default_prompt_file(),
            level_label: Self::default_level_label(),
            replay_unanswered_turns: false,
        }
    }
}

impl ConversationConfig {
    const fn default_max_turns() -> u32 {
        10
    }

    fn default_closing_message() -> String {
        "Merci pour cette conversation ! À bientôt !".to_string()
    }

    fn default_prompt_file() -> Option<PathBuf> {
        Some(PathBuf::from("prompts/francie.md"))
    }

    fn default_level_label() -> String {
        DEFAULT_LEVEL_LABEL.to_string()
    }

    /// Resolve the instruction prompt from inline text or its file.
    ///
    /// A relative `instruction_prompt_file` is resolved against `base_dir`
    /// when given, else against the working directory.
    pub fn instruction_prompt(&self, base_dir: Option<&Path>) -> anyhow::Result<InstructionPrompt> {
        let text = match (&self.instruction_prompt, &self.instruction_prompt_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => {
                let path = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.clone(),
                };
                std::fs::read_to_string(&path).map_err(|e| {
                    anyhow::anyhow!("Cannot read instruction prompt at {}: {e}", path.display())
                })?
            }
            (None, None) => anyhow::bail!(
                "No instruction prompt configured. Set conversation.instruction_prompt or conversation.instruction_prompt_file."
            ),
        };

        let prompt = InstructionPrompt::new(text).with_level_label(self.level_label.clone());
        if prompt.is_blank() {
            anyhow::bail!("Instruction prompt is empty");
        }
        Ok(prompt)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "ProviderConfig::default_name")]
    pub name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default = "ProviderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            api_key: String::new(),
            model: None,
            base_url: None,
            temperature: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    fn default_name() -> String {
        "mistral".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        30
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
        }
    }
}

impl DatabaseConfig {
    fn default_url() -> String {
        "sqlite://chat.db?mode=rwc".to_string()
    }
}

/// Environment variables that override file settings.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub max_turns: Option<String>,
    pub api_key: Option<String>,
    pub provider: Option<String>,
    pub database_url: Option<String>,
}

impl EnvOverrides {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_turns: std::env::var("MAX_TURNS").ok(),
            api_key: std::env::var("LLM_API_KEY").ok(),
            provider: std::env::var("LLM_PROVIDER").ok(),
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }
}

impl Config {
    /// Default location: `~/francie/config.json`.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR)
            .join(CONFIG_FILE))
    }

    /// `path` if given, else the default location.
    pub fn resolve_path(path: Option<&Path>) -> anyhow::Result<PathBuf> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load from `path` (or the default location) and apply environment
    /// overrides. A missing file falls back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = Self::resolve_path(path)?;

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid config at {}: {e}", path.display()))?;
            info!("Loaded config from {}", path.display());
            config
        } else {
            warn!(
                "Config file not found at {}, using defaults. Run 'francie init' to create one.",
                path.display()
            );
            Self::default()
        };

        config.apply_overrides(&EnvOverrides::from_env())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, env: &EnvOverrides) -> anyhow::Result<()> {
        if let Some(raw) = env.max_turns.as_deref() {
            self.conversation.max_turns = raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_TURNS '{raw}': {e}"))?;
        }
        if let Some(key) = &env.api_key {
            self.provider.api_key.clone_from(key);
        }
        if let Some(name) = &env.provider {
            self.provider.name.clone_from(name);
        }
        if let Some(url) = &env.database_url {
            self.database.url.clone_from(url);
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.conversation.max_turns == 0 {
            anyhow::bail!("conversation.max_turns must be at least 1");
        }
        if self.conversation.closing_message.trim().is_empty() {
            anyhow::bail!("conversation.closing_message must not be empty");
        }
        if self.provider.timeout_secs == 0 {
            anyhow::bail!("provider.timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Write the config template to `path` (or the default location).
    pub fn create_config(path: Option<&Path>) -> anyhow::Result<PathBuf> {
        let config_path = Self::resolve_path(path)?;
        if let Some(dir) = config_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "server": {
    "bind": "127.0.0.1:8000",
    "index_path": "index.html"
  },
  "conversation": {
    "max_turns": 10,
    "closing_message": "Merci pour cette conversation ! À bientôt !",
    "instruction_prompt_file": "prompts/francie.md",
    "level_label": "Niveau",
    "replay_unanswered_turns": false
  },
  "provider": {
    "name": "mistral",
    "api_key": "",
    "timeout_secs": 30
  },
  "database": {
    "url": "sqlite://chat.db?mode=rwc"
  }
}"#;

        std::fs::write(&config_path, config_template)?;
        Ok(config_path)
    }
}
