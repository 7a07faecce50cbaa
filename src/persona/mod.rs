//! Persona system: maps workflow identifiers to agent personas.
//!
//! The registry is injected into the workflow controller at construction
//! time. Every workflow id resolves to exactly one persona; ids without a
//! binding get the fallback persona.

pub mod registry;
pub mod types;

pub use registry::{PersonaRegistry, AUDIT, COMMUNITY, DOC_MANAGER, KNOWLEDGE};
pub use types::{Persona, PersonaBinding};
