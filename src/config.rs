//! Configuration system for ai-workflow
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (AI_WORKFLOW_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::persona::registry::duplicate_ids;
use crate::persona::{Persona, PersonaBinding};
use crate::workflow::InvokerSettings;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Model service connection settings
    pub model: ModelSettings,

    /// Per-attempt time limit and retry budget
    pub retry: RetrySettings,

    /// Workflow-to-persona bindings
    pub personas: PersonaSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Model service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// API base URL (e.g., "https://api.openai.com/v1", "http://localhost:11434/v1")
    pub base_url: String,

    /// API key (empty = not configured)
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Transport-level request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Per-attempt time limit in milliseconds
    pub timeout_ms: u64,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds (doubles each retry)
    pub base_delay_ms: u64,

    /// Upper bound on any single retry delay in milliseconds
    pub max_delay_ms: u64,
}

/// Persona settings. Configured bindings take precedence over bundled ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaSettings {
    /// Persona for unbound workflow ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Persona>,

    /// Explicit workflow bindings
    pub bindings: Vec<PersonaBinding>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl WorkflowConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e.message()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        for path in search_paths() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Model settings
        if let Ok(val) = std::env::var("AI_WORKFLOW_API_KEY") {
            self.model.api_key = val;
        }
        if let Ok(val) = std::env::var("AI_WORKFLOW_BASE_URL") {
            self.model.base_url = val;
        }
        if let Ok(val) = std::env::var("AI_WORKFLOW_MODEL") {
            self.model.model = val;
        }

        // Retry settings
        if let Ok(val) = std::env::var("AI_WORKFLOW_TIMEOUT_MS") {
            if let Ok(n) = val.parse() {
                self.retry.timeout_ms = n;
            }
        }
        if let Ok(val) = std::env::var("AI_WORKFLOW_MAX_RETRIES") {
            if let Ok(n) = val.parse() {
                self.retry.max_retries = n;
            }
        }
        if let Ok(val) = std::env::var("AI_WORKFLOW_BASE_DELAY_MS") {
            if let Ok(n) = val.parse() {
                self.retry.base_delay_ms = n;
            }
        }

        // Logging settings
        if let Ok(val) = std::env::var("AI_WORKFLOW_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("AI_WORKFLOW_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("AI_WORKFLOW_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration.
    ///
    /// A missing API key is not an error here; it surfaces as a
    /// configuration failure on the first workflow run instead.
    pub fn validate(&self) -> Result<()> {
        // Model settings
        let url = Url::parse(&self.model.base_url).map_err(|e| {
            Error::config_field_invalid(
                "model.base_url",
                format!("'{}' is not a valid URL: {}", self.model.base_url, e),
            )
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::config_field_invalid(
                "model.base_url",
                "Base URL must start with http:// or https://",
            ));
        }
        if self.model.model.trim().is_empty() {
            return Err(Error::config_field_invalid("model.model", "Model cannot be empty"));
        }
        if self.model.request_timeout_secs == 0 {
            return Err(Error::config_field_invalid(
                "model.request_timeout_secs",
                "request_timeout_secs must be greater than zero",
            ));
        }

        // Retry settings
        if self.retry.timeout_ms == 0 {
            return Err(Error::config_field_invalid(
                "retry.timeout_ms",
                "timeout_ms must be greater than zero",
            ));
        }
        if self.retry.base_delay_ms == 0 {
            return Err(Error::config_field_invalid(
                "retry.base_delay_ms",
                "base_delay_ms must be greater than zero",
            ));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(Error::config_field_invalid(
                "retry.max_delay_ms",
                format!(
                    "max_delay_ms ({}) must not be less than base_delay_ms ({})",
                    self.retry.max_delay_ms, self.retry.base_delay_ms
                ),
            ));
        }

        // Persona bindings
        if self.personas.bindings.iter().any(|b| b.workflow_id.trim().is_empty()) {
            return Err(Error::config_field_invalid(
                "personas.bindings",
                "Persona binding workflow_id cannot be empty",
            ));
        }
        let duplicates = duplicate_ids(&self.personas.bindings);
        if !duplicates.is_empty() {
            return Err(Error::config_field_invalid(
                "personas.bindings",
                format!("Duplicate persona bindings: {}", duplicates.join(", ")),
            ));
        }

        // Log level
        if !VALID_LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// The configured API key, if any
    pub fn api_key(&self) -> Option<String> {
        let key = self.model.api_key.trim();
        (!key.is_empty()).then(|| key.to_string())
    }

    /// Credential and model for the invoker
    pub fn invoker_settings(&self) -> InvokerSettings {
        InvokerSettings::new(self.api_key(), self.model.model.clone())
    }

    /// Copy safe to print, with the API key masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.model.api_key.is_empty() {
            config.model.api_key = "********".to_string();
        }
        config
    }
}

/// Standard configuration file locations, in search order
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("ai-workflow.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("ai-workflow").join("config.toml"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".ai-workflow").join("config.toml"));
    }
    paths.push(PathBuf::from("/etc/ai-workflow/config.toml"));
    paths
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file, returning where it was written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".ai-workflow")
                .join("config.toml")
        });

    // Check if file exists
    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    // Create parent directories
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
pub fn generate_default_config() -> String {
    r#"# ai-workflow configuration

[model]
# API base URL (OpenAI, Ollama, vLLM, LM Studio, etc.)
base_url = "https://api.openai.com/v1"

# API key (or set AI_WORKFLOW_API_KEY)
api_key = ""

# Model identifier
model = "gpt-4o-mini"

# Transport-level request timeout in seconds
request_timeout_secs = 120

[retry]
# Per-attempt time limit in milliseconds
timeout_ms = 30000

# Retries after the first attempt
max_retries = 2

# Delay before the first retry in milliseconds (doubles each retry)
base_delay_ms = 500

# Upper bound on any single retry delay in milliseconds
max_delay_ms = 30000

[personas]
# Persona for workflow ids with no binding
# fallback = { display_name = "Business Assistant", instructions = "Help with general business tasks." }

# Bindings here replace the bundled persona for the same workflow id
# [[personas.bindings]]
# workflow_id = "audit"
# display_name = "Site Safety Auditor"
# instructions = "Audit glazing sites against the safety manual."

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.ai-workflow/logs/ai-workflow.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
