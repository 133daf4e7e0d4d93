use serde_json::{Map, Value};

use crate::domain::{GenerationParams, Message, ProviderError};

use super::provider::{LlmProvider, ProviderConfig};
use super::response_shaping::{shape_chat_reply, shape_completion};

const PROVIDER_NAME: &str = "mock";
const DEFAULT_MODEL_NAME: &str = "mock-model";

#[derive(Debug)]
pub struct MockProvider {
    model_name: String,
    options: Map<String, Value>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            options: Map::new(),
        }
    }

    pub fn with_model_name(model_name: impl Into<String>) -> Result<Self, ProviderError> {
        Self::from_config(ProviderConfig::new().with_model_name(model_name))
    }

    pub fn from_config(config: ProviderConfig) -> Result<Self, ProviderError> {
        let model_name = config.model_name_or(DEFAULT_MODEL_NAME)?;
        Ok(Self {
            model_name,
            options: config.options,
        })
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for MockProvider {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ProviderError> {
        Ok(shape_completion(prompt, params))
    }

    fn chat(
        &self,
        conversation: &[Message],
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        Ok(shape_chat_reply(conversation, params))
    }
}
