use crate::providers::gemini::client::GEMINI_BASE_URL;
use crate::providers::openai::client::{NVIDIA_BASE_URL, OPENAI_BASE_URL, OPENROUTER_BASE_URL};
use crate::{Error, GeminiProvider, LLMProvider, OpenAIProvider};
use std::env;
use std::time::Duration;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAI,
    Nvidia,
    OpenRouter,
    Gemini,
}

impl ProviderType {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "OPENAI_API_KEY",
            ProviderType::Nvidia => "NVIDIA_API_KEY",
            ProviderType::OpenRouter => "OPENROUTER_API_KEY",
            ProviderType::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => OPENAI_BASE_URL,
            ProviderType::Nvidia => NVIDIA_BASE_URL,
            ProviderType::OpenRouter => OPENROUTER_BASE_URL,
            ProviderType::Gemini => GEMINI_BASE_URL,
        }
    }

    fn parse(value: &str) -> Result<Self, Error> {
        match value.to_lowercase().as_str() {
            "openai" => Ok(ProviderType::OpenAI),
            "nvidia" => Ok(ProviderType::Nvidia),
            "openrouter" => Ok(ProviderType::OpenRouter),
            "gemini" | "google" => Ok(ProviderType::Gemini),
            _ => Err(Error::config(format!(
                "Invalid PROVIDER_TYPE '{value}'. \
                 Valid values are: nvidia, openrouter, gemini, openai"
            ))),
        }
    }
}

/// Provider settings, read once at startup and shared read-only afterwards.
#[derive(Clone)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub extra_headers: Vec<(String, String)>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider_type", &self.provider_type)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(provider_type: ProviderType, api_key: String, model: String) -> Self {
        Self {
            provider_type,
            api_key,
            model,
            base_url: None,
            timeout: Duration::from_secs(60),
            extra_headers: Vec::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Base URL override, or the provider's public endpoint.
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider_type.default_base_url())
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// `PROVIDER_TYPE` selects the provider explicitly; without it the first
    /// provider whose API key is set wins (NVIDIA, OpenRouter, Gemini, OpenAI).
    pub fn from_vars<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let provider_type = match get("PROVIDER_TYPE") {
            Some(value) => ProviderType::parse(value.trim())?,
            None => [
                ProviderType::Nvidia,
                ProviderType::OpenRouter,
                ProviderType::Gemini,
                ProviderType::OpenAI,
            ]
            .into_iter()
            .find(|p| get(p.api_key_var()).is_some())
            .ok_or_else(|| {
                Error::config(
                    "No API credentials found in environment. Set PROVIDER_TYPE \
                     (nvidia/openrouter/gemini/openai) with the matching API key",
                )
            })?,
        };

        let api_key = get(provider_type.api_key_var()).ok_or_else(|| {
            Error::config(format!(
                "{} environment variable is required for {provider_type:?} provider",
                provider_type.api_key_var()
            ))
        })?;

        let model = get("LLM_MODEL")
            .ok_or_else(|| Error::config("LLM_MODEL environment variable is required"))?;

        let mut config = Self::new(provider_type, api_key, model.trim().to_string());
        config.base_url = get("LLM_BASE_URL");

        if let Some(secs) = get("LLM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| {
                    Error::config(format!("LLM_TIMEOUT_SECS must be an integer, got '{secs}'"))
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        if provider_type == ProviderType::OpenRouter {
            if let Some(referer) = get("OPENROUTER_REFERER") {
                config.extra_headers.push(("HTTP-Referer".to_string(), referer));
            }
            if let Some(title) = get("OPENROUTER_TITLE") {
                config.extra_headers.push(("X-Title".to_string(), title));
            }
        }

        Ok(config)
    }
}

/// Factory for creating LLM providers.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider from configuration.
    pub fn create(config: &ProviderConfig) -> Result<Box<dyn LLMProvider>, Error> {
        let base_url = config.effective_base_url().to_string();
        let api_key = config.api_key.clone();

        let provider: Box<dyn LLMProvider> = match config.provider_type {
            ProviderType::Gemini => Box::new(GeminiProvider::with_timeout(
                api_key,
                base_url,
                config.timeout,
            )?),
            openai_compatible => {
                let name = match openai_compatible {
                    ProviderType::Nvidia => "NVIDIA",
                    ProviderType::OpenRouter => "OpenRouter",
                    _ => "OpenAI",
                };
                let mut provider =
                    OpenAIProvider::with_timeout(api_key, base_url, config.timeout)?
                        .with_name(name);
                for (header, value) in &config.extra_headers {
                    provider = provider.with_header(header, value)?;
                }
                Box::new(provider)
            }
        };

        tracing::info!(
            provider = provider.name(),
            model = %config.model,
            base_url = config.effective_base_url(),
            "LLM provider configured"
        );
        Ok(provider)
    }

    /// Create a provider from environment variables.
    pub fn from_env() -> Result<(ProviderConfig, Box<dyn LLMProvider>), Error> {
        let config = ProviderConfig::from_env()?;
        let provider = Self::create(&config)?;
        Ok((config, provider))
    }
}
