//! Schema contracts: the exact shapes each workflow must return.
//!
//! Every contract is a closed object: all fields required, enumerated fields
//! limited to their declared literals, and unexpected fields rejected. Each
//! one carries a `questions` list so the model can ask for missing
//! information instead of fabricating it.

pub mod audit;
pub mod catalog;
pub mod community;
pub mod contract;
pub mod document;
pub mod knowledge;

pub use audit::AuditContract;
pub use catalog::{SchemaCatalog, SchemaKind};
pub use community::CommunityActionContract;
pub use contract::{SchemaContract, StructuralSchema};
pub use document::{DocumentContract, DocumentStatus, DocumentType};
pub use knowledge::KnowledgeContract;
