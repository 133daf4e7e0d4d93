use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCategory {
    UserActionRequired,
    TemporaryFailure,
    InternalFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider configuration invalid: {message}")]
    Configuration { message: String },
    #[error("unsupported provider '{requested}' (available providers: {})", .available.join(", "))]
    UnsupportedProvider {
        requested: String,
        available: Vec<String>,
    },
    #[error("invalid provider registration: {message}")]
    InvalidProvider { message: String },
    #[error("provider authentication failed")]
    Auth,
    #[error("provider rate limit reached")]
    RateLimited,
    #[error("provider request timed out")]
    Timeout,
    #[error("provider returned an invalid response: {message}")]
    InvalidResponse { message: String },
    #[error("provider transport failed: {message}")]
    Transport { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ProviderError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unsupported_provider(requested: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnsupportedProvider {
            requested: requested.into(),
            available,
        }
    }

    pub fn invalid_provider(message: impl Into<String>) -> Self {
        Self::InvalidProvider {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ProviderErrorCategory {
        match self {
            Self::Configuration { .. }
            | Self::UnsupportedProvider { .. }
            | Self::InvalidProvider { .. }
            | Self::Auth => ProviderErrorCategory::UserActionRequired,
            Self::RateLimited | Self::Timeout | Self::Transport { .. } => {
                ProviderErrorCategory::TemporaryFailure
            }
            Self::InvalidResponse { .. } | Self::Internal { .. } => {
                ProviderErrorCategory::InternalFailure
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::Transport { .. }
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration { message } => {
                format!("Please review the provider configuration: {message}")
            }
            Self::UnsupportedProvider {
                requested,
                available,
            } => {
                format!(
                    "Provider '{requested}' is not registered. Available providers: {}",
                    available.join(", ")
                )
            }
            Self::InvalidProvider { message } => {
                format!("The provider registration was rejected: {message}")
            }
            Self::Auth => {
                "Authentication failed. Check your provider API key and configuration.".to_string()
            }
            Self::RateLimited => {
                "The provider is rate limiting requests. Please retry in a moment.".to_string()
            }
            Self::Timeout => "The provider did not respond in time. Please retry.".to_string(),
            Self::InvalidResponse { message } => {
                format!("The provider returned an invalid response format: {message}")
            }
            Self::Transport { message } => {
                format!("Could not reach the provider service: {message}")
            }
            Self::Internal { message } => {
                format!("An internal error occurred while generating: {message}")
            }
        }
    }
}
