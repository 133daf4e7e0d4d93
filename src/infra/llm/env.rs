use std::time::Duration;

use crate::domain::ProviderError;

pub(crate) fn read_env_var(name: &str) -> Result<Option<String>, ProviderError> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(ProviderError::configuration(format!(
            "{name} could not be read: {error}"
        ))),
    }
}

pub(crate) fn parse_timeout_seconds(name: &str, value: &str) -> Result<Duration, ProviderError> {
    let parsed = value.trim().parse::<u64>().map_err(|_| {
        ProviderError::configuration(format!("{name} must be a positive integer in seconds"))
    })?;
    if parsed == 0 {
        return Err(ProviderError::configuration(format!(
            "{name} must be greater than 0 seconds"
        )));
    }
    Ok(Duration::from_secs(parsed))
}

pub(crate) fn read_timeout_from_env(name: &str) -> Result<Option<Duration>, ProviderError> {
    let Some(value) = read_env_var(name)? else {
        return Ok(None);
    };
    Ok(Some(parse_timeout_seconds(name, &value)?))
}

pub(crate) fn resolve_timeout_with_global_fallback<F>(
    provider_timeout: Option<Duration>,
    read_global_timeout: F,
    default_timeout: Duration,
) -> Result<Duration, ProviderError>
where
    F: FnOnce() -> Result<Option<Duration>, ProviderError>,
{
    if let Some(timeout) = provider_timeout {
        return Ok(timeout);
    }

    Ok(read_global_timeout()?.unwrap_or(default_timeout))
}

pub(crate) fn resolve_api_key<F>(
    explicit: Option<String>,
    read_env_fallback: F,
) -> Result<Option<String>, ProviderError>
where
    F: FnOnce() -> Result<Option<String>, ProviderError>,
{
    if let Some(key) = explicit
        && !key.trim().is_empty()
    {
        return Ok(Some(key));
    }

    let Some(key) = read_env_fallback()? else {
        return Ok(None);
    };
    if key.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(key))
}
