use chat_client_core::ClientError;
use reqwest::Client as HttpClient;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::resources::chat::ChatResource;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) url: String,
    pub(crate) model: String,
    pub(crate) temperature: f32,
    pub(crate) timeout: Duration,
    pub(crate) system_prompt: Option<String>,
    pub(crate) headers: HeaderMap,
}

// Manually implement Debug to redact the API key
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

impl ClientConfig {
    /// Both the key and the endpoint URL are required; everything else has a default.
    pub fn new(api_key: impl Into<String>, url: impl Into<String>) -> Result<Self, ClientError> {
        let api_key = require_non_empty("API key", api_key.into())?;
        let url = require_non_empty("API URL", url.into())?;

        let bearer = format!("Bearer {}", api_key);
        let mut auth_value = HeaderValue::from_str(&bearer)
            .map_err(|e| ClientError::ConfigError(format!("Invalid API key: {}", e)))?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            url,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            system_prompt: None,
            headers,
        })
    }

    /// Build a config from process environment variables.
    ///
    /// See [`ClientConfig::from_lookup`] for the recognized names.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from `API_KEY`, `API_URL`, `MODEL`, `TEMPERATURE`,
    /// `REQUEST_TIMEOUT_SECS` and `SYSTEM_PROMPT`, resolved through `lookup`.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key =
            get("API_KEY").ok_or_else(|| ClientError::ConfigError("API_KEY is not set".to_string()))?;
        let url =
            get("API_URL").ok_or_else(|| ClientError::ConfigError("API_URL is not set".to_string()))?;

        let mut config = Self::new(api_key, url)?;

        if let Some(model) = get("MODEL") {
            config = config.with_model(model);
        }
        if let Some(raw) = get("TEMPERATURE") {
            let temperature = raw.trim().parse::<f32>().map_err(|e| {
                ClientError::ConfigError(format!("TEMPERATURE '{}' is not a number: {}", raw, e))
            })?;
            config = config.with_temperature(temperature)?;
        }
        if let Some(raw) = get("REQUEST_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                ClientError::ConfigError(format!(
                    "REQUEST_TIMEOUT_SECS '{}' is not a whole number of seconds: {}",
                    raw, e
                ))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(system_prompt) = get("SYSTEM_PROMPT") {
            config = config.with_system_prompt(system_prompt);
        }

        Ok(config)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Result<Self, ClientError> {
        self.url = require_non_empty("API URL", url.into())?;
        Ok(self)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Result<Self, ClientError> {
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(ClientError::ConfigError(format!(
                "temperature {} is outside [{}, {}]",
                temperature,
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            )));
        }
        self.temperature = temperature;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }
}

fn require_non_empty(what: &str, value: String) -> Result<String, ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::ConfigError(format!("{} must not be empty", what)));
    }
    Ok(value)
}

/// Reusable handle for the chat completion endpoint.
///
/// Holds no mutable state, so clones can be used from several tasks at once.
#[derive(Clone, Debug)]
pub struct Client {
    pub(crate) http_client: HttpClient,
    pub(crate) config: Arc<ClientConfig>,
}

impl Client {
    pub fn new(api_key: impl Into<String>, url: impl Into<String>) -> Result<Self, ClientError> {
        let config = ClientConfig::new(api_key, url)?;
        Self::from_config(config)
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_config(ClientConfig::from_env()?)
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = HttpClient::builder()
            .default_headers(config.headers.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Access the Chat Completions resource.
    pub fn chat(&self) -> ChatResource {
        ChatResource::new(self.clone())
    }

    /// Send `prompt` as a single user message and return the reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, ClientError> {
        self.chat().complete(prompt).await
    }
}
