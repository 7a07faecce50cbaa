//! Persona registry: resolves a workflow identifier to exactly one persona.

use std::collections::HashSet;

use crate::config::PersonaSettings;

use super::types::{Persona, PersonaBinding};

/// Workflow identifiers that ship with a bundled persona.
pub const DOC_MANAGER: &str = "doc-manager";
pub const AUDIT: &str = "audit";
pub const KNOWLEDGE: &str = "knowledge";
pub const COMMUNITY: &str = "community";

/// Ordered identifier-to-persona mapping with a mandatory fallback.
///
/// Built once at startup and shared read-only; resolution never fails.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    bindings: Vec<PersonaBinding>,
    fallback: Persona,
}

impl PersonaRegistry {
    /// Create an empty registry that resolves everything to `fallback`.
    pub fn new(fallback: Persona) -> Self {
        Self {
            bindings: Vec::new(),
            fallback,
        }
    }

    /// Add a binding. Earlier bindings win over later ones with the same id.
    pub fn with_binding(mut self, workflow_id: impl Into<String>, persona: Persona) -> Self {
        self.bindings.push(PersonaBinding::new(workflow_id, persona));
        self
    }

    /// Bundled personas for the built-in workflows.
    pub fn builtin() -> Self {
        Self::new(default_fallback())
            .with_binding(
                DOC_MANAGER,
                Persona::new(
                    "Document Controller",
                    "You draft controlled business documents such as work instructions, \
                     procedures and policies. Fill every field of the requested structure. \
                     When information needed to complete the document is missing, add a \
                     question instead of inventing details.",
                ),
            )
            .with_binding(
                AUDIT,
                Persona::new(
                    "Compliance Auditor",
                    "You prepare audit reports and checklists against the nominated standard. \
                     Record findings with a severity and a corrective action. Ask questions \
                     for any evidence you were not given.",
                ),
            )
            .with_binding(
                KNOWLEDGE,
                Persona::new(
                    "Knowledge Assistant",
                    "You answer questions about company processes using only the material \
                     provided. Cite sources and state your confidence. Ask a question when \
                     the material does not cover the request.",
                ),
            )
            .with_binding(
                COMMUNITY,
                Persona::new(
                    "Community Coordinator",
                    "You turn community involvement requests into concrete, owned actions \
                     with due dates. Ask questions for anything the request leaves open.",
                ),
            )
    }

    /// Build from configuration: configured bindings first, then bundled
    /// bindings whose id is not configured.
    pub fn from_settings(settings: &PersonaSettings) -> Self {
        let builtin = Self::builtin();
        let fallback = settings
            .fallback
            .clone()
            .unwrap_or_else(|| builtin.fallback.clone());

        let mut bindings = settings.bindings.clone();
        let configured: HashSet<String> =
            bindings.iter().map(|b| b.workflow_id.clone()).collect();
        bindings.extend(
            builtin
                .bindings
                .into_iter()
                .filter(|b| !configured.contains(&b.workflow_id)),
        );

        Self { bindings, fallback }
    }

    /// Resolve a workflow id. Unknown ids (including "") get the fallback.
    pub fn resolve(&self, workflow_id: &str) -> &Persona {
        self.bindings
            .iter()
            .find(|b| b.workflow_id == workflow_id)
            .map(|b| &b.persona)
            .unwrap_or(&self.fallback)
    }

    /// Whether `workflow_id` has its own binding.
    pub fn is_bound(&self, workflow_id: &str) -> bool {
        self.bindings.iter().any(|b| b.workflow_id == workflow_id)
    }

    pub fn bindings(&self) -> &[PersonaBinding] {
        &self.bindings
    }

    pub fn fallback(&self) -> &Persona {
        &self.fallback
    }

    /// Identifiers bound more than once, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<String> {
        duplicate_ids(&self.bindings)
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Identifiers that appear more than once in `bindings`.
pub fn duplicate_ids(bindings: &[PersonaBinding]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for binding in bindings {
        if !seen.insert(binding.workflow_id.as_str()) && !dupes.contains(&binding.workflow_id) {
            dupes.push(binding.workflow_id.clone());
        }
    }
    dupes
}

fn default_fallback() -> Persona {
    Persona::new(
        "Business Assistant",
        "You help staff of a trade business with operational paperwork. Answer in the \
         requested structure only, and ask a question whenever information is missing.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_resolve_to_their_persona() {
        let registry = PersonaRegistry::builtin();
        assert_eq!(registry.resolve(DOC_MANAGER).display_name, "Document Controller");
        assert_eq!(registry.resolve(AUDIT).display_name, "Compliance Auditor");
        assert_eq!(registry.resolve(KNOWLEDGE).display_name, "Knowledge Assistant");
        assert_eq!(registry.resolve(COMMUNITY).display_name, "Community Coordinator");
    }

    #[test]
    fn test_unknown_and_empty_ids_use_fallback() {
        let registry = PersonaRegistry::builtin();
        for id in ["", "unknown", "DOC-MANAGER", " doc-manager", "doc-manager ", "🤖"] {
            assert_eq!(registry.resolve(id), registry.fallback(), "id {:?}", id);
        }
    }

    #[test]
    fn test_first_binding_wins_on_collision() {
        let registry = PersonaRegistry::new(Persona::new("Fallback", "f"))
            .with_binding("audit", Persona::new("First", "1"))
            .with_binding("audit", Persona::new("Second", "2"));

        assert_eq!(registry.resolve("audit").display_name, "First");
        assert_eq!(registry.duplicate_ids(), vec!["audit".to_string()]);
    }

    #[test]
    fn test_empty_registry_is_total() {
        let registry = PersonaRegistry::new(Persona::new("Only", "only"));
        assert_eq!(registry.resolve("anything").display_name, "Only");
        assert!(!registry.is_bound("anything"));
    }

    #[test]
    fn test_from_settings_overrides_builtin() {
        let settings = PersonaSettings {
            fallback: Some(Persona::new("Custom Fallback", "fb")),
            bindings: vec![PersonaBinding::new(
                AUDIT,
                Persona::new("Site Safety Auditor", "Audit glazing sites."),
            )],
        };

        let registry = PersonaRegistry::from_settings(&settings);
        assert_eq!(registry.resolve(AUDIT).display_name, "Site Safety Auditor");
        assert_eq!(registry.resolve(DOC_MANAGER).display_name, "Document Controller");
        assert_eq!(registry.resolve("nope").display_name, "Custom Fallback");
        assert!(registry.duplicate_ids().is_empty());
    }

    #[test]
    fn test_from_default_settings_matches_builtin() {
        let registry = PersonaRegistry::from_settings(&PersonaSettings::default());
        assert_eq!(registry.bindings().len(), 4);
        assert_eq!(registry.fallback(), PersonaRegistry::builtin().fallback());
    }
}
