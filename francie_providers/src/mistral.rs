use async_trait::async_trait;
use francie_core::{
    ChatMessage, CompletionGateway, GatewayError, InstructionPrompt, Level, compose_messages,
};
use tracing::info;

use crate::{ChatCompletionsClient, ProviderOptions};

const BASE_URL: &str = "https://api.mistral.ai/v1";
const DEFAULT_MODEL: &str = "mistral-small-latest";
const DEFAULT_TEMPERATURE: f32 = 0.6;

pub struct MistralProvider {
    client: ChatCompletionsClient,
}

impl MistralProvider {
    pub fn new(api_key: String) -> Result<Self, GatewayError> {
        Self::client(&ProviderOptions::new("mistral", api_key)).map(Self::from_client)
    }

    pub(crate) fn client(options: &ProviderOptions) -> Result<ChatCompletionsClient, GatewayError> {
        info!("Creating MistralProvider");
        Ok(ChatCompletionsClient::new(
            "mistral",
            options.api_key.clone(),
            options.base_url.clone().unwrap_or_else(|| BASE_URL.to_string()),
            options
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            options.timeout,
        )?
        .with_temperature(Some(options.temperature.unwrap_or(DEFAULT_TEMPERATURE))))
    }

    pub(crate) const fn from_client(client: ChatCompletionsClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl CompletionGateway for MistralProvider {
    fn provider_name(&self) -> &str {
        self.client.provider()
    }

    fn ensure_configured(&self) -> Result<(), GatewayError> {
        self.client.ensure_configured()
    }

    async fn generate_reply(
        &self,
        history: &[ChatMessage],
        level: Level,
        instruction: &InstructionPrompt,
    ) -> Result<String, GatewayError> {
        let messages = compose_messages(instruction, level, history);
        self.client.complete(&messages).await
    }
}
