use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{GenerationParams, Message, ProviderError};

use super::env::{
    read_env_var, read_timeout_from_env, resolve_api_key, resolve_timeout_with_global_fallback,
};
use super::provider::{LlmProvider, ProviderConfig};

const PROVIDER_NAME: &str = "openai";
const DEFAULT_MODEL_NAME: &str = "gpt-3.5-turbo";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
const ENV_API_KEY: &str = "TEXTSMITH_OPENAI_API_KEY";
const ENV_API_KEY_FALLBACK: &str = "OPENAI_API_KEY";
const ENV_BASE_URL: &str = "TEXTSMITH_OPENAI_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "TEXTSMITH_OPENAI_TIMEOUT_SECS";
const ENV_GLOBAL_TIMEOUT_SECS: &str = "TEXTSMITH_LLM_TIMEOUT_SECS";
const OPTION_API_KEY: &str = "api_key";
const OPTION_BASE_URL: &str = "api_base_url";
const MAX_ERROR_MESSAGE_LEN: usize = 256;

#[derive(Debug)]
pub struct OpenAiProvider {
    model_name: String,
    api_key: String,
    api_base_url: String,
    client: Client,
    options: Map<String, Value>,
}

impl OpenAiProvider {
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_config(DEFAULT_MODEL_NAME, api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_config(ProviderConfig::new())
    }

    pub fn from_config(config: ProviderConfig) -> Result<Self, ProviderError> {
        let model_name = config.model_name_or(DEFAULT_MODEL_NAME)?;

        let explicit_key = config.option_str(OPTION_API_KEY).map(str::to_owned);
        let api_key = resolve_api_key(explicit_key, || {
            Ok(read_env_var(ENV_API_KEY)?.or(read_env_var(ENV_API_KEY_FALLBACK)?))
        })?
        .ok_or_else(|| {
            ProviderError::configuration(
                "OpenAI API key is missing (pass api_key or set TEXTSMITH_OPENAI_API_KEY or OPENAI_API_KEY)",
            )
        })?;

        let api_base_url = match config.option_str(OPTION_BASE_URL) {
            Some(url) => url.to_string(),
            None => read_env_var(ENV_BASE_URL)?.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };

        let provider_timeout = read_timeout_from_env(ENV_TIMEOUT_SECS)?;
        let timeout = resolve_timeout_with_global_fallback(
            provider_timeout,
            || read_timeout_from_env(ENV_GLOBAL_TIMEOUT_SECS),
            DEFAULT_TIMEOUT,
        )?;

        let mut provider = Self::with_config(model_name, api_key, api_base_url, timeout)?;
        provider.options = config.options;
        provider.options.remove(OPTION_API_KEY);
        Ok(provider)
    }

    pub fn with_config(
        model_name: impl Into<String>,
        api_key: impl Into<String>,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let model_name = model_name.into();
        if model_name.trim().is_empty() {
            return Err(ProviderError::configuration("model name must not be empty"));
        }

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::configuration(
                "OpenAI API key must not be empty",
            ));
        }

        let api_base_url = api_base_url.into();
        if api_base_url.trim().is_empty() {
            return Err(ProviderError::configuration(
                "OpenAI API base URL must not be empty",
            ));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            ProviderError::configuration(format!("failed to create OpenAI HTTP client: {err}"))
        })?;

        Ok(Self {
            model_name: model_name.trim().to_string(),
            api_key,
            api_base_url,
            client,
            options: Map::new(),
        })
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    fn endpoint_url(&self) -> String {
        build_v1_url(&self.api_base_url, "chat/completions")
    }

    fn build_request_payload(
        &self,
        messages: Vec<ChatMessage>,
        params: &GenerationParams,
    ) -> ChatCompletionsRequest {
        ChatCompletionsRequest {
            model: self.model_name.clone(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            extra: params.extra.clone(),
        }
    }

    fn execute(&self, payload: &ChatCompletionsRequest) -> Result<String, ProviderError> {
        let url = self.endpoint_url();
        debug!(model = %payload.model, url = %url, "dispatching chat completions request");
        let started = Instant::now();

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(payload)
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        let response_body = response.text().map_err(map_transport_error)?;
        if !status.is_success() {
            warn!(status = %status, "chat completions request failed");
            return Err(map_http_error(status, &response_body));
        }

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(elapsed_ms, "chat completions request succeeded");
        extract_completion_text(&response_body)
    }
}

impl LlmProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ProviderError> {
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }];
        self.execute(&self.build_request_payload(messages, params))
    }

    fn chat(
        &self,
        conversation: &[Message],
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let messages = conversation
            .iter()
            .map(|message| ChatMessage {
                role: message.role.as_str().to_string(),
                content: message.content.clone(),
            })
            .collect();
        self.execute(&self.build_request_payload(messages, params))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<Value>,
}

fn extract_completion_text(response_body: &str) -> Result<String, ProviderError> {
    let response: ChatCompletionsResponse = serde_json::from_str(response_body).map_err(|err| {
        ProviderError::invalid_response(format!("chat completions response decode failed: {err}"))
    })?;

    let first = response.choices.into_iter().next().ok_or_else(|| {
        ProviderError::invalid_response("chat completions response did not include any choices")
    })?;

    // Absent or null content is a valid empty completion, not an error.
    if let Some(text) = first.text {
        return Ok(text);
    }
    let text = first
        .message
        .and_then(|message| message.content)
        .map(|content| extract_message_content(&content))
        .unwrap_or_default();
    Ok(text)
}

fn extract_message_content(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts.iter().filter_map(extract_content_part_text).collect(),
        _ => String::new(),
    }
}

fn extract_content_part_text(part: &Value) -> Option<String> {
    match part {
        Value::String(text) => Some(text.to_string()),
        Value::Object(map) => map
            .get("text")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        _ => None,
    }
}

fn map_http_error(status: StatusCode, body: &str) -> ProviderError {
    let parsed_error = serde_json::from_str::<OpenAiErrorEnvelope>(body).ok();
    let error_type = parsed_error
        .as_ref()
        .and_then(|envelope| envelope.error.as_ref())
        .and_then(|detail| detail.error_type.as_deref());
    let error_code = parsed_error
        .as_ref()
        .and_then(|envelope| envelope.error.as_ref())
        .and_then(|detail| detail.code.as_deref());

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || matches!(error_type, Some("authentication_error"))
        || matches!(
            error_code,
            Some("invalid_api_key" | "invalid_authentication")
        )
    {
        return ProviderError::Auth;
    }

    if status == StatusCode::TOO_MANY_REQUESTS
        || matches!(error_type, Some("rate_limit_error" | "insufficient_quota"))
        || matches!(
            error_code,
            Some("rate_limit_exceeded" | "insufficient_quota")
        )
    {
        return ProviderError::RateLimited;
    }

    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::GATEWAY_TIMEOUT
        || matches!(error_type, Some("timeout" | "server_timeout"))
        || matches!(error_code, Some("request_timeout"))
    {
        return ProviderError::Timeout;
    }

    let message = parsed_error
        .as_ref()
        .and_then(|envelope| envelope.error.as_ref())
        .map(|detail| detail.message.clone())
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| truncate_message(body));

    ProviderError::Transport {
        message: format!("OpenAI API returned HTTP {status}: {message}"),
    }
}

fn map_transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        return ProviderError::Timeout;
    }

    ProviderError::Transport {
        message: format!("OpenAI transport error: {error}"),
    }
}

fn truncate_message(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

fn build_v1_url(api_base_url: &str, endpoint_path: &str) -> String {
    let base = api_base_url.trim_end_matches('/');
    let endpoint_path = endpoint_path.trim_start_matches('/');

    if base.ends_with("/v1") {
        format!("{base}/{endpoint_path}")
    } else {
        format!("{base}/v1/{endpoint_path}")
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    #[serde(default)]
    error: Option<OpenAiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}
