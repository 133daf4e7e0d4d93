mod env;
mod mock;
mod openai;
mod provider;
mod provider_registry;
mod response_shaping;

pub use mock::MockProvider;
pub use openai::OpenAiProvider;
pub use provider::{LlmProvider, ProviderConfig};
pub use provider_registry::{ProviderConstructor, ProviderRegistry};
pub use response_shaping::{
    HIGH_TEMPERATURE_THRESHOLD, LOW_TEMPERATURE_THRESHOLD, MOCK_MARKER,
    SHORT_RESPONSE_TOKEN_LIMIT,
};
