use std::sync::Arc;

use crate::domain::ProviderError;

use super::mock::MockProvider;
use super::openai::OpenAiProvider;
use super::provider::{LlmProvider, ProviderConfig};

pub type ProviderConstructor =
    Arc<dyn Fn(ProviderConfig) -> Result<Arc<dyn LlmProvider>, ProviderError> + Send + Sync>;

#[derive(Clone)]
struct RegistryEntry {
    name: String,
    constructor: ProviderConstructor,
}

#[derive(Clone)]
pub struct ProviderRegistry {
    entries: Vec<RegistryEntry>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            entries: vec![
                RegistryEntry {
                    name: "mock".to_string(),
                    constructor: Arc::new(|config| {
                        Ok(Arc::new(MockProvider::from_config(config)?) as Arc<dyn LlmProvider>)
                    }),
                },
                RegistryEntry {
                    name: "openai".to_string(),
                    constructor: Arc::new(|config| {
                        Ok(Arc::new(OpenAiProvider::from_config(config)?) as Arc<dyn LlmProvider>)
                    }),
                },
            ],
        }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        constructor: F,
    ) -> Result<(), ProviderError>
    where
        F: Fn(ProviderConfig) -> Result<Arc<dyn LlmProvider>, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        self.register_shared(name, Arc::new(constructor))
    }

    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        constructor: ProviderConstructor,
    ) -> Result<(), ProviderError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(ProviderError::invalid_provider(
                "provider name must not be empty",
            ));
        }

        // Re-registration replaces the constructor and keeps the entry position.
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.name == name) {
            entry.constructor = constructor;
        } else {
            self.entries.push(RegistryEntry {
                name: name.to_string(),
                constructor,
            });
        }
        Ok(())
    }

    pub fn create(
        &self,
        name: &str,
        config: ProviderConfig,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let requested = name.trim();
        let Some(entry) = self.entries.iter().find(|entry| entry.name == requested) else {
            return Err(ProviderError::unsupported_provider(
                requested,
                self.provider_names(),
            ));
        };

        (entry.constructor)(config)
    }

    pub fn create_mock(
        &self,
        model_name: impl Into<String>,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.create("mock", ProviderConfig::new().with_model_name(model_name))
    }

    pub fn create_openai(
        &self,
        model_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.create(
            "openai",
            ProviderConfig::new()
                .with_model_name(model_name)
                .with_option("api_key", api_key.into()),
        )
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::domain::{GenerationParams, Message, ProviderError};

    use super::super::provider::{LlmProvider, ProviderConfig};
    use super::ProviderRegistry;

    struct FakeProvider {
        model_name: String,
    }

    impl LlmProvider for FakeProvider {
        fn provider_name(&self) -> &str {
            "fake"
        }

        fn model_name(&self) -> &str {
            &self.model_name
        }

        fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, ProviderError> {
            Ok("fake completion".to_string())
        }

        fn chat(
            &self,
            _conversation: &[Message],
            _params: &GenerationParams,
        ) -> Result<String, ProviderError> {
            Ok("fake reply".to_string())
        }
    }

    fn fake_constructor(
        config: ProviderConfig,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(FakeProvider {
            model_name: config.model_name_or("fake-model")?,
        }))
    }

    #[test]
    fn new_registers_builtin_providers_in_order() {
        let registry = ProviderRegistry::new();

        assert_eq!(registry.provider_names(), vec!["mock", "openai"]);
        assert!(registry.contains("mock"));
        assert!(registry.contains("openai"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn create_builds_mock_provider_with_merged_model_name() {
        let registry = ProviderRegistry::new();

        let provider = registry
            .create("mock", ProviderConfig::new().with_model_name("test-mock"))
            .expect("mock provider should build");

        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.model_name(), "test-mock");
    }

    #[test]
    fn create_rejects_unknown_provider_and_lists_known_names() {
        let registry = ProviderRegistry::new();

        let error = registry
            .create("unknown-name", ProviderConfig::new())
            .expect_err("unknown provider should fail");

        assert!(matches!(
            error,
            ProviderError::UnsupportedProvider { requested, available }
            if requested == "unknown-name"
                && available == vec!["mock".to_string(), "openai".to_string()]
        ));
    }

    #[test]
    fn register_rejects_blank_provider_name() {
        let mut registry = ProviderRegistry::empty();

        let error = registry
            .register("   ", fake_constructor)
            .expect_err("blank provider name should fail");

        assert!(matches!(
            error,
            ProviderError::InvalidProvider { message }
            if message == "provider name must not be empty"
        ));
    }

    #[test]
    fn register_appends_custom_provider_after_builtins() {
        let mut registry = ProviderRegistry::new();
        registry
            .register("custom", fake_constructor)
            .expect("custom registration should succeed");

        assert_eq!(registry.provider_names(), vec!["mock", "openai", "custom"]);

        let provider = registry
            .create("custom", ProviderConfig::new().with_model_name("custom-model"))
            .expect("custom provider should build");
        assert_eq!(provider.provider_name(), "fake");
        assert_eq!(provider.model_name(), "custom-model");
    }

    #[test]
    fn reregistration_replaces_constructor_and_keeps_position() {
        let mut registry = ProviderRegistry::new();

        registry
            .register("mock", fake_constructor)
            .expect("overwriting registration should succeed");

        assert_eq!(registry.provider_names(), vec!["mock", "openai"]);

        let provider = registry
            .create("mock", ProviderConfig::new())
            .expect("overwritten constructor should be used");
        assert_eq!(provider.provider_name(), "fake");
    }

    #[test]
    fn create_mock_convenience_builds_named_mock() {
        let registry = ProviderRegistry::new();

        let provider = registry
            .create_mock("demo-model")
            .expect("mock provider should build");

        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.model_name(), "demo-model");
    }

    #[test]
    fn create_openai_convenience_passes_credential_as_option() {
        let registry = ProviderRegistry::new();

        let provider = registry
            .create_openai("gpt-4", "test-key")
            .expect("openai provider should build without network access");

        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_name(), "gpt-4");
    }

    #[test]
    fn constructor_errors_propagate_unwrapped() {
        let registry = ProviderRegistry::new();

        let error = registry
            .create("mock", ProviderConfig::new().with_model_name("  "))
            .expect_err("blank model name should fail inside the constructor");

        assert!(matches!(error, ProviderError::Configuration { .. }));
    }

    #[test]
    fn empty_registry_has_no_providers() {
        let registry = ProviderRegistry::empty();

        assert!(registry.is_empty());
        assert!(!registry.contains("mock"));
    }
}
