//! Process-wide set of compiled schemas, built once at startup.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::persona::{AUDIT, COMMUNITY, DOC_MANAGER, KNOWLEDGE};

use super::audit::AuditContract;
use super::community::CommunityActionContract;
use super::contract::StructuralSchema;
use super::document::DocumentContract;
use super::knowledge::KnowledgeContract;

// ─────────────────────────────────────────────────────────────────
// Schema Kind
// ─────────────────────────────────────────────────────────────────

/// The workflow output shapes this crate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    Document,
    Audit,
    Knowledge,
    Community,
}

impl SchemaKind {
    pub fn slug(&self) -> &'static str {
        match self {
            SchemaKind::Document => "document",
            SchemaKind::Audit => "audit",
            SchemaKind::Knowledge => "knowledge",
            SchemaKind::Community => "community",
        }
    }

    pub fn all() -> &'static [SchemaKind] {
        &[
            SchemaKind::Document,
            SchemaKind::Audit,
            SchemaKind::Knowledge,
            SchemaKind::Community,
        ]
    }

    /// Default schema for a bundled workflow id.
    pub fn for_workflow(workflow_id: &str) -> Option<SchemaKind> {
        match workflow_id {
            DOC_MANAGER => Some(SchemaKind::Document),
            AUDIT => Some(SchemaKind::Audit),
            KNOWLEDGE => Some(SchemaKind::Knowledge),
            COMMUNITY => Some(SchemaKind::Community),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "document" | "doc" => Ok(SchemaKind::Document),
            "audit" => Ok(SchemaKind::Audit),
            "knowledge" => Ok(SchemaKind::Knowledge),
            "community" | "community-action" => Ok(SchemaKind::Community),
            _ => Err(format!(
                "Unknown schema '{}'. Valid: document, audit, knowledge, community",
                s
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Schema Catalog
// ─────────────────────────────────────────────────────────────────

/// Compiled schemas shared read-only across requests.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    pub document: Arc<StructuralSchema<DocumentContract>>,
    pub audit: Arc<StructuralSchema<AuditContract>>,
    pub knowledge: Arc<StructuralSchema<KnowledgeContract>>,
    pub community: Arc<StructuralSchema<CommunityActionContract>>,
}

impl SchemaCatalog {
    /// Compile every bundled schema
    pub fn load() -> Result<Self> {
        Ok(Self {
            document: Arc::new(StructuralSchema::compile()?),
            audit: Arc::new(StructuralSchema::compile()?),
            knowledge: Arc::new(StructuralSchema::compile()?),
            community: Arc::new(StructuralSchema::compile()?),
        })
    }

    /// JSON Schema for a kind
    pub fn definition(&self, kind: SchemaKind) -> &Value {
        match kind {
            SchemaKind::Document => self.document.definition(),
            SchemaKind::Audit => self.audit.definition(),
            SchemaKind::Knowledge => self.knowledge.definition(),
            SchemaKind::Community => self.community.definition(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_compiles() {
        let catalog = SchemaCatalog::load().unwrap();
        for kind in SchemaKind::all() {
            assert_eq!(catalog.definition(*kind)["type"], "object");
        }
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("document".parse::<SchemaKind>().unwrap(), SchemaKind::Document);
        assert_eq!("AUDIT".parse::<SchemaKind>().unwrap(), SchemaKind::Audit);
        assert_eq!("community-action".parse::<SchemaKind>().unwrap(), SchemaKind::Community);
        assert!("invoice".parse::<SchemaKind>().is_err());
    }

    #[test]
    fn test_kind_for_workflow() {
        assert_eq!(SchemaKind::for_workflow("doc-manager"), Some(SchemaKind::Document));
        assert_eq!(SchemaKind::for_workflow("knowledge"), Some(SchemaKind::Knowledge));
        assert_eq!(SchemaKind::for_workflow("crm-followup"), None);
    }
}
