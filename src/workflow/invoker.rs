//! Agent invoker
//!
//! Performs exactly one model call: build a single-turn request for a persona
//! and schema, dispatch it to the backend, and validate what comes back.
//! Retries and time limits belong to the caller.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::backend::{AgentRequest, ChatTurn, ModelBackend};
use crate::error::{Error, Result};
use crate::persona::Persona;
use crate::schema::{SchemaContract, StructuralSchema};

/// Credential and model the invoker sends with every request
#[derive(Clone, Default)]
pub struct InvokerSettings {
    pub credential: Option<String>,
    pub model: String,
}

impl InvokerSettings {
    pub fn new(credential: Option<String>, model: impl Into<String>) -> Self {
        Self {
            credential,
            model: model.into(),
        }
    }
}

impl fmt::Debug for InvokerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvokerSettings")
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

/// Output of one successful call
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation<T> {
    pub parsed: T,
    pub raw: String,
}

/// Single-shot caller of a model backend
#[derive(Clone)]
pub struct AgentInvoker {
    backend: Arc<dyn ModelBackend>,
    settings: InvokerSettings,
}

impl AgentInvoker {
    pub fn new(backend: Arc<dyn ModelBackend>, settings: InvokerSettings) -> Self {
        Self { backend, settings }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Call the model once and validate its answer against `schema`.
    pub async fn invoke<T: SchemaContract>(
        &self,
        persona: &Persona,
        schema: &StructuralSchema<T>,
        input: &str,
    ) -> Result<Invocation<T>> {
        let credential = match self.settings.credential.as_deref() {
            Some(key) if !key.trim().is_empty() => key.to_string(),
            _ => return Err(Error::MissingCredential),
        };

        let request = AgentRequest {
            model: self.settings.model.clone(),
            credential,
            persona: persona.clone(),
            schema_name: schema.name().to_string(),
            schema: schema.definition().clone(),
            messages: vec![ChatTurn::user(input)],
        };

        debug!(
            backend = self.backend.name(),
            persona = %persona,
            schema = schema.name(),
            "Dispatching model request"
        );

        let content = match self.backend.generate(&request).await? {
            Some(content) if !content.trim().is_empty() => content,
            _ => return Err(Error::NoOutput),
        };

        let parsed = schema.validate(&content)?;
        let raw = schema.serialize(&parsed)?;

        Ok(Invocation { parsed, raw })
    }
}

impl fmt::Debug for AgentInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentInvoker")
            .field("backend", &self.backend.name())
            .field("settings", &self.settings)
            .finish()
    }
}
