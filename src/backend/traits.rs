//! Backend trait definitions
//!
//! Defines the `ModelBackend` trait every model service adapter implements,
//! and the single-shot request it receives.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::persona::Persona;

// ─────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────

/// Speaker of a conversational turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One conversational turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Everything a backend needs for one attempt.
///
/// `messages` carries exactly one user turn; no history crosses attempts.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// Model identifier
    pub model: String,

    /// Model-service credential (already checked to be present)
    pub credential: String,

    /// Persona presented to the model
    pub persona: Persona,

    /// Name of the output schema
    pub schema_name: String,

    /// JSON Schema the output must conform to
    pub schema: Value,

    /// The conversation turns (a single user message)
    pub messages: Vec<ChatTurn>,
}

// ─────────────────────────────────────────────────────────────────
// ModelBackend Trait
// ─────────────────────────────────────────────────────────────────

/// A remote generative-model service.
///
/// Implementations classify their own failures by returning the matching
/// `Error` variant; they never retry.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Backend name (e.g., "openai", "mock")
    fn name(&self) -> &'static str;

    /// Send one request. `Ok(None)` means the service answered with no content.
    async fn generate(&self, request: &AgentRequest) -> Result<Option<String>>;
}
