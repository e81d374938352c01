//! Model endpoint configuration.
//!
//! Lives under the `model:` key of the service config file. When no file is
//! present the same settings are read from the conventional OpenAI / Azure
//! OpenAI environment variables.

use serde::{Deserialize, Serialize};

use super::errors::InferenceError;

/// Which flavor of the Chat Completions API to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// `POST {base_url}/chat/completions`, bearer token, model in the body.
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// `POST {base_url}/openai/deployments/{deployment}/chat/completions`,
    /// `api-key` header, model chosen by the deployment.
    Azure,
}

/// A single model endpoint's runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Azure deployment name.
    #[serde(default)]
    pub deployment: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request timeout for one decision call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}
fn default_api_version() -> String {
    "2023-12-01-preview".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4000
}
fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            base_url: default_base_url(),
            model_name: default_model_name(),
            deployment: None,
            api_version: default_api_version(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ModelConfig {
    /// Build from environment variables.
    ///
    /// `AZURE_OPENAI_ENDPOINT` selects Azure (with `AZURE_OPENAI_API_KEY`,
    /// `AZURE_OPENAI_DEPLOYMENT_NAME`, `AZURE_OPENAI_API_VERSION`); otherwise
    /// `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_MODEL` are used.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(endpoint) = var("AZURE_OPENAI_ENDPOINT") {
            config.provider = Provider::Azure;
            config.base_url = endpoint;
            config.api_key = var("AZURE_OPENAI_API_KEY");
            config.deployment = var("AZURE_OPENAI_DEPLOYMENT_NAME");
            if let Some(version) = var("AZURE_OPENAI_API_VERSION") {
                config.api_version = version;
            }
        } else {
            config.api_key = var("OPENAI_API_KEY");
            if let Some(base_url) = var("OPENAI_BASE_URL") {
                config.base_url = base_url;
            }
            if let Some(model) = var("OPENAI_MODEL") {
                config.model_name = model;
            }
        }
        config
    }

    /// Check the fields the provider needs before any request is sent.
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.base_url.trim().is_empty() {
            return Err(InferenceError::ConfigError {
                reason: "model endpoint (base_url) is not set".into(),
            });
        }
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(InferenceError::ConfigError {
                reason: "api_key is not set".into(),
            });
        }
        if self.provider == Provider::Azure
            && self.deployment.as_deref().map_or(true, str::is_empty)
        {
            return Err(InferenceError::ConfigError {
                reason: "azure deployment name is not set".into(),
            });
        }
        Ok(())
    }

    /// Full chat completions URL for this provider.
    pub fn completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.provider {
            Provider::OpenAi => format!("{base}/chat/completions"),
            Provider::Azure => format!(
                "{base}/openai/deployments/{}/chat/completions?api-version={}",
                self.deployment.as_deref().unwrap_or_default(),
                self.api_version
            ),
        }
    }

    /// Name sent in the request body; Azure takes it from the URL.
    pub fn request_model(&self) -> Option<String> {
        match self.provider {
            Provider::OpenAi => Some(self.model_name.clone()),
            Provider::Azure => None,
        }
    }

    /// Label for logs.
    pub fn display_name(&self) -> &str {
        match self.provider {
            Provider::OpenAi => &self.model_name,
            Provider::Azure => self.deployment.as_deref().unwrap_or("azure"),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
