use async_trait::async_trait;
use francie_core::{
    ChatMessage, CompletionGateway, GatewayError, InstructionPrompt, Level, compose_messages,
};
use tracing::info;

use crate::{ChatCompletionsClient, ProviderOptions};

const BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
const DEFAULT_MODEL: &str = "glm-4-flash";

pub struct ZhipuProvider {
    client: ChatCompletionsClient,
}

impl ZhipuProvider {
    pub fn new(api_key: String) -> Result<Self, GatewayError> {
        Self::client(&ProviderOptions::new("zhipu", api_key)).map(Self::from_client)
    }

    pub(crate) fn client(options: &ProviderOptions) -> Result<ChatCompletionsClient, GatewayError> {
        info!("Creating ZhipuProvider");
        Ok(ChatCompletionsClient::new(
            "zhipu",
            options.api_key.clone(),
            options.base_url.clone().unwrap_or_else(|| BASE_URL.to_string()),
            options
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            options.timeout,
        )?
        .with_temperature(options.temperature))
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
impl CompletionGateway for ZhipuProvider {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_flash_model() {
        let provider = ZhipuProvider::new("key".to_string()).unwrap();
        assert_eq!(provider.model(), "glm-4-flash");
        assert_eq!(provider.provider_name(), "zhipu");
    }
}
