use serde_json::{Map, Value};

use crate::domain::{GenerationParams, Message, ProviderError};

pub trait LlmProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ProviderError>;

    fn chat(
        &self,
        conversation: &[Message],
        params: &GenerationParams,
    ) -> Result<String, ProviderError>;

    fn describe(&self) -> String {
        format!("{}(model={})", self.provider_name(), self.model_name())
    }
}

impl std::fmt::Debug for dyn LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub model_name: Option<String>,
    pub options: Map<String, Value>,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    pub fn model_name_or(&self, default_model_name: &str) -> Result<String, ProviderError> {
        let model_name = self
            .model_name
            .as_deref()
            .unwrap_or(default_model_name)
            .trim();
        if model_name.is_empty() {
            return Err(ProviderError::configuration(
                "model name must not be empty",
            ));
        }
        Ok(model_name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{GenerationParams, Message, ProviderError};

    use super::{LlmProvider, ProviderConfig};

    struct NamedProvider;

    impl LlmProvider for NamedProvider {
        fn provider_name(&self) -> &str {
            "named"
        }

        fn model_name(&self) -> &str {
            "named-model"
        }

        fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, ProviderError> {
            Ok("generated".to_string())
        }

        fn chat(
            &self,
            _conversation: &[Message],
            _params: &GenerationParams,
        ) -> Result<String, ProviderError> {
            Ok("chatted".to_string())
        }
    }

    #[test]
    fn describe_combines_provider_and_model_name() {
        assert_eq!(NamedProvider.describe(), "named(model=named-model)");
    }

    #[test]
    fn model_name_or_prefers_configured_name() {
        let config = ProviderConfig::new().with_model_name("custom-model");
        let model_name = config
            .model_name_or("default-model")
            .expect("configured model name should resolve");

        assert_eq!(model_name, "custom-model");
    }

    #[test]
    fn model_name_or_falls_back_to_default() {
        let model_name = ProviderConfig::new()
            .model_name_or("default-model")
            .expect("default model name should resolve");

        assert_eq!(model_name, "default-model");
    }

    #[test]
    fn model_name_or_rejects_blank_name() {
        let error = ProviderConfig::new()
            .with_model_name("   ")
            .model_name_or("default-model")
            .expect_err("blank model name should fail");

        assert!(matches!(
            error,
            ProviderError::Configuration { message } if message == "model name must not be empty"
        ));
    }

    #[test]
    fn option_str_reads_string_options_only() {
        let config = ProviderConfig::new()
            .with_option("api_key", "test-key")
            .with_option("attempts", 3);

        assert_eq!(config.option_str("api_key"), Some("test-key"));
        assert_eq!(config.option_str("attempts"), None);
        assert_eq!(config.option_str("missing"), None);
    }
}
