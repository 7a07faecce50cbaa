//! Core types for the persona system.
//!
//! A persona is the display identity and instruction text presented to the
//! model backend for a given workflow.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Persona
// ─────────────────────────────────────────────────────────────────

/// Instruction text and display identity for one agent persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Human-readable name shown to the model and in listings.
    pub display_name: String,

    /// System instructions sent with every request made under this persona.
    pub instructions: String,
}

impl Persona {
    pub fn new(display_name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            instructions: instructions.into(),
        }
    }

    /// System message content for a request under this persona.
    pub fn system_prompt(&self) -> String {
        format!("You are {}.\n\n{}", self.display_name, self.instructions)
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Binding (loaded from TOML)
// ─────────────────────────────────────────────────────────────────

/// Binds one workflow identifier to a persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaBinding {
    /// Workflow identifier matched exactly against the request's workflow id.
    pub workflow_id: String,

    /// The persona used for that workflow.
    #[serde(flatten)]
    pub persona: Persona,
}

impl PersonaBinding {
    pub fn new(workflow_id: impl Into<String>, persona: Persona) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            persona,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_includes_name_and_instructions() {
        let persona = Persona::new("Audit Lead", "Produce audit reports.");
        let prompt = persona.system_prompt();
        assert!(prompt.starts_with("You are Audit Lead."));
        assert!(prompt.ends_with("Produce audit reports."));
    }

    #[test]
    fn test_binding_toml_is_flat() {
        let binding: PersonaBinding = toml::from_str(
            r#"
workflow_id = "doc-manager"
display_name = "Document Controller"
instructions = "Draft controlled documents."
"#,
        )
        .unwrap();

        assert_eq!(binding.workflow_id, "doc-manager");
        assert_eq!(binding.persona.display_name, "Document Controller");
    }
}
