//! Service configuration.
//!
//! Read from a YAML file with `${VAR}` / `${VAR:-default}` interpolation, so
//! secrets stay in the environment:
//!
//! ```yaml
//! bind_addr: "0.0.0.0:8000"
//! upload_dir: ~/.sheet-analyst/uploads
//! model:
//!   provider: azure
//!   base_url: "${AZURE_OPENAI_ENDPOINT}"
//!   deployment: ${AZURE_OPENAI_DEPLOYMENT_NAME:-gpt-4o}
//!   api_key: "${AZURE_OPENAI_API_KEY}"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::DEFAULT_MAX_STEPS;
use crate::inference::ModelConfig;
use crate::session::DEFAULT_MAX_SESSIONS;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "SHEET_ANALYST_CONFIG";

/// File name searched for when walking upward from the working directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config: {reason}")]
    Parse { reason: String },

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Uploaded files land in `<upload_dir>/<session-id>/`.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Where the persistence tool writes `.json` files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_max_agent_steps")]
    pub max_agent_steps: usize,
    /// Live sessions kept before the least recently used is evicted.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Largest accepted upload body.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Allowed CORS origins; `"*"` allows any.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Log to `<log_dir>/service.log` instead of stdout.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default = "ModelConfig::from_env")]
    pub model: ModelConfig,
}

fn default_app_name() -> String {
    "Sheet Analyst".to_string()
}
fn default_app_version() -> String {
    "1.0.0".to_string()
}
fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_max_agent_steps() -> usize {
    DEFAULT_MAX_STEPS
}
fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_version: default_app_version(),
            debug: false,
            bind_addr: default_bind_addr(),
            upload_dir: default_upload_dir(),
            output_dir: default_output_dir(),
            max_agent_steps: default_max_agent_steps(),
            max_sessions: default_max_sessions(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_origins: default_cors_origins(),
            log_dir: None,
            json_logs: false,
            model: ModelConfig::from_env(),
        }
    }
}

impl ServiceConfig {
    /// Locate and load the config file, or fall back to defaults plus the
    /// model environment variables when none exists.
    pub fn load() -> Result<Self, ConfigError> {
        let start = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match find_config_path(&start) {
            Some(path) => {
                let config = Self::from_file(&path)?;
                tracing::debug!(path = %path.display(), "config loaded");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(raw);
        let mut config: ServiceConfig =
            serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
                reason: e.to_string(),
            })?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Tilde expansion on paths, and unset `${VAR}` secrets read as absent.
    fn normalize(&mut self) {
        self.upload_dir = expand_tilde_path(&self.upload_dir);
        self.output_dir = expand_tilde_path(&self.output_dir);
        self.log_dir = self.log_dir.as_deref().map(expand_tilde_path);
        if self.model.api_key.as_deref().is_some_and(str::is_empty) {
            self.model.api_key = None;
        }
        if self.model.deployment.as_deref().is_some_and(str::is_empty) {
            self.model.deployment = None;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_agent_steps == 0 {
            return Err(ConfigError::Invalid {
                reason: "max_agent_steps must be at least 1".into(),
            });
        }
        if self.max_sessions == 0 {
            return Err(ConfigError::Invalid {
                reason: "max_sessions must be at least 1".into(),
            });
        }
        if self.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "bind_addr is empty".into(),
            });
        }
        Ok(())
    }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// `SHEET_ANALYST_CONFIG` if it points at a file, else the nearest
/// `config.yaml` walking upward from `start`.
pub fn find_config_path(start: &Path) -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let candidate = PathBuf::from(expand_tilde(&path));
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();
        let expr: String = chars.by_ref().take_while(|&c| c != '}').collect();
        result.push_str(&resolve_var_expr(&expr));
    }

    result
}

fn resolve_var_expr(expr: &str) -> String {
    match expr.split_once(":-") {
        Some((name, default)) => std::env::var(name)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()),
        None => std::env::var(expr).unwrap_or_default(),
    }
}

fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.display());
        }
    }
    path.to_string()
}

fn expand_tilde_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(expand_tilde(s)),
        None => path.to_path_buf(),
    }
}
