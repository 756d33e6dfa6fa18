use std::path::PathBuf;

use francie_config::Config;

const BUNDLED_PROMPT: &str = include_str!("../../../prompts/francie.md");

/// Strategy for initializing the configuration.
///
/// Writes the config template and the bundled instruction prompt next to it.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, config_path: Self::Input) -> anyhow::Result<()> {
        let config_path = Config::create_config(config_path.as_deref())?;

        let prompt_path = config_path
            .parent()
            .map_or_else(|| PathBuf::from("prompts"), |dir| dir.join("prompts"))
            .join("francie.md");
        if !prompt_path.exists() {
            if let Some(dir) = prompt_path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(&prompt_path, BUNDLED_PROMPT)?;
        }

        println!("✅ Created config file at: {}", config_path.display());
        println!("✅ Instruction prompt at: {}", prompt_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Fill in provider.api_key in the config file (or set LLM_API_KEY)");
        println!("      Turns are refused until a key is configured");
        println!("   2. Adjust the instruction prompt if you want a different tutor persona");
        println!("   3. Run 'francie serve' and open http://127.0.0.1:8000/");
        println!();
        Ok(())
    }
}
