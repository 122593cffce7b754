//! Configuration file support for autodoc
//!
//! Loads run settings from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.autodocrc.json` in the working directory
//! 3. `autodoc.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::extract::DEFAULT_MAX_ATTEMPTS;
use crate::oracle::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::prompt::{PromptTemplate, FUNCTION_PLACEHOLDER};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_ATTEMPTS_LIMIT: usize = 10;

/// autodoc configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutodocConfig {
    /// Gemini model id (default: gemini-1.5-flash)
    #[serde(default)]
    pub model: Option<String>,

    /// Generation attempts per function before giving up (default: 2)
    #[serde(default)]
    pub max_attempts: Option<usize>,

    /// Prompt template with a `{function}` placeholder
    #[serde(default)]
    pub prompt: Option<String>,

    /// Gemini API base URL, for proxies and tests
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// HTTP timeout per request in seconds (default: 60)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Configuration with defaults filled in
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model: String,
    pub max_attempts: usize,
    pub prompt: PromptTemplate,
    pub api_base_url: String,
    pub timeout: Duration,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl AutodocConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                anyhow::bail!("model must not be empty");
            }
        }

        if let Some(attempts) = self.max_attempts {
            if attempts == 0 || attempts > MAX_ATTEMPTS_LIMIT {
                anyhow::bail!(
                    "max_attempts must be between 1 and {} (got {})",
                    MAX_ATTEMPTS_LIMIT,
                    attempts
                );
            }
        }

        if let Some(prompt) = &self.prompt {
            if !prompt.contains(FUNCTION_PLACEHOLDER) {
                anyhow::bail!("prompt must contain the {} placeholder", FUNCTION_PLACEHOLDER);
            }
        }

        if let Some(url) = &self.api_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("api_base_url must be an http(s) URL (got {})", url);
            }
        }

        if self.timeout_secs == Some(0) {
            anyhow::bail!("timeout_secs must be positive");
        }

        Ok(())
    }

    /// Resolve config into the form used by a run
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let prompt = match &self.prompt {
            Some(template) => PromptTemplate::new(template.clone())?,
            None => PromptTemplate::default(),
        };

        Ok(ResolvedConfig {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            prompt,
            api_base_url: self
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        AutodocConfig::default().resolve()
    }
}

/// Discover and load a config file from `dir`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(dir: &Path) -> Result<Option<(AutodocConfig, PathBuf)>> {
    for name in [".autodocrc.json", "autodoc.config.json"] {
        let path = dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<AutodocConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: AutodocConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `dir`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (AutodocConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
