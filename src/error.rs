//! Error types for the AI workflow core
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - A failure classification that drives the retry controller
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for workflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,
    MissingCredential = 103,
    InvalidTimeout = 104,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoNotFound = 203,

    // Backend / transport errors (3xx)
    BackendTimeout = 301,
    BackendUnavailable = 302,
    BackendRejected = 303,
    AuthenticationFailed = 304,

    // Output errors (4xx)
    NoOutput = 400,
    SchemaViolation = 401,
    MalformedPayload = 402,

    // Execution errors (5xx)
    ExecutionCancelled = 502,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Backend errors
            400..=499 => 40, // Output errors
            500..=599 => 50, // Execution errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────
// Failure Classification
// ─────────────────────────────────────────────────────────────────

/// Coarse failure kind attached to every non-success outcome.
///
/// The retry controller decides retry-vs-surface from this tag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureClassification {
    /// The per-attempt deadline expired.
    Timeout,
    /// The backend answered but produced nothing to validate.
    NoOutput,
    /// Rate limit or temporary unavailability signalled by the backend.
    RetryableTransient,
    /// Schema violation or any other unclassified failure.
    NonRetryableFailure,
    /// Missing credential or invalid settings.
    ConfigurationError,
}

impl FailureClassification {
    /// Whether an unchanged retry has a reasonable chance of succeeding
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureClassification::Timeout
                | FailureClassification::NoOutput
                | FailureClassification::RetryableTransient
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClassification::Timeout => "timeout",
            FailureClassification::NoOutput => "no-output",
            FailureClassification::RetryableTransient => "retryable-transient",
            FailureClassification::NonRetryableFailure => "non-retryable",
            FailureClassification::ConfigurationError => "configuration-error",
        }
    }
}

impl fmt::Display for FailureClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the workflow core
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No model-service credential is configured
    #[error("Model service credential is not configured")]
    MissingCredential,

    /// Per-attempt timeout must be positive
    #[error("Invalid timeout: {timeout_ms}ms (must be greater than zero)")]
    InvalidTimeout { timeout_ms: u64 },

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Backend Errors
    // ─────────────────────────────────────────────────────────────

    /// The attempt did not settle before its deadline
    #[error("Model invocation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Rate limit or temporary unavailability
    #[error("Model service temporarily unavailable: {message}")]
    Transient { message: String, status: Option<u16> },

    /// The backend refused the credential
    #[error("Model service rejected the credential: {message}")]
    AuthenticationFailed { message: String },

    /// Any other backend failure
    #[error("Model service error: {message}")]
    Backend { message: String, status: Option<u16> },

    // ─────────────────────────────────────────────────────────────
    // Output Errors
    // ─────────────────────────────────────────────────────────────

    /// The backend produced no content
    #[error("Model returned no output")]
    NoOutput,

    /// The content does not conform to the requested schema
    #[error("Output does not match schema '{schema}': {message}")]
    SchemaViolation { schema: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Execution Errors
    // ─────────────────────────────────────────────────────────────

    /// The caller cancelled the run
    #[error("Workflow run cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,
            Error::MissingCredential => ErrorCode::MissingCredential,
            Error::InvalidTimeout { .. } => ErrorCode::InvalidTimeout,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::MalformedPayload,

            Error::Timeout { .. } => ErrorCode::BackendTimeout,
            Error::Transient { .. } => ErrorCode::BackendUnavailable,
            Error::AuthenticationFailed { .. } => ErrorCode::AuthenticationFailed,
            Error::Backend { .. } => ErrorCode::BackendRejected,

            Error::NoOutput => ErrorCode::NoOutput,
            Error::SchemaViolation { .. } => ErrorCode::SchemaViolation,

            Error::Cancelled => ErrorCode::ExecutionCancelled,
            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the failure classification used by the retry controller
    pub fn classification(&self) -> FailureClassification {
        match self {
            Error::ConfigNotFound { .. }
            | Error::ConfigParse { .. }
            | Error::ConfigValidation { .. }
            | Error::Config(_)
            | Error::MissingCredential
            | Error::InvalidTimeout { .. } => FailureClassification::ConfigurationError,

            Error::Timeout { .. } => FailureClassification::Timeout,
            Error::NoOutput => FailureClassification::NoOutput,
            Error::Transient { .. } => FailureClassification::RetryableTransient,

            Error::IoRead { .. }
            | Error::IoWrite { .. }
            | Error::Io(_)
            | Error::Toml(_)
            | Error::Json(_)
            | Error::AuthenticationFailed { .. }
            | Error::Backend { .. }
            | Error::SchemaViolation { .. }
            | Error::Cancelled
            | Error::Internal(_) => FailureClassification::NonRetryableFailure,
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        self.classification().is_retryable()
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'ai-workflow config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'ai-workflow config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::MissingCredential => Some(
                "Set AI_WORKFLOW_API_KEY or 'api_key' under [model] in the configuration file."
            ),
            Error::InvalidTimeout { .. } => Some(
                "Use a timeout greater than zero, e.g. --timeout-ms 30000."
            ),
            Error::Timeout { .. } => Some(
                "The model service is slow to respond. Raise --timeout-ms or --max-retries."
            ),
            Error::Transient { .. } => Some(
                "The model service is rate limiting or unavailable. Try again shortly."
            ),
            Error::AuthenticationFailed { .. } => Some(
                "Verify the API key is valid for the configured base URL."
            ),
            Error::SchemaViolation { .. } => Some(
                "The model answered in an unexpected shape. Rephrase the input or try another model."
            ),
            Error::NoOutput => Some(
                "The model produced an empty answer. Check that the model supports structured output."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m ({}): {}\n",
            code.as_str(),
            self.classification(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] ({}) {}", self.code().as_str(), self.classification(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors (for ergonomic error creation)
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a transient backend error
    pub fn transient(message: impl Into<String>, status: Option<u16>) -> Self {
        Error::Transient {
            message: message.into(),
            status,
        }
    }

    /// Create a non-retryable backend error
    pub fn backend(message: impl Into<String>, status: Option<u16>) -> Self {
        Error::Backend {
            message: message.into(),
            status,
        }
    }

    /// Create a schema violation error
    pub fn schema_violation(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Error::SchemaViolation {
            schema: schema.into(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
