//! Controlled-document contract (doc-manager workflow)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::contract::{array, boolean, enumeration, object, questions, string, SchemaContract};

/// A drafted controlled document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentContract {
    pub metadata: DocumentMetadata,
    pub sections: Vec<DocumentSection>,
    pub checklist: Vec<ChecklistItem>,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentMetadata {
    pub document_id: String,
    pub title: String,
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub version: String,
    /// ISO-8601 date as text
    pub effective_date: String,
    pub owner: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "Work Instruction")]
    WorkInstruction,
    Procedure,
    Policy,
    Form,
    Register,
    #[serde(rename = "Safe Work Method Statement")]
    SafeWorkMethodStatement,
}

impl DocumentType {
    pub const VALUES: &'static [&'static str] = &[
        "Work Instruction",
        "Procedure",
        "Policy",
        "Form",
        "Register",
        "Safe Work Method Statement",
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Draft,
    #[serde(rename = "In Review")]
    InReview,
    Approved,
    Superseded,
}

impl DocumentStatus {
    pub const VALUES: &'static [&'static str] = &["Draft", "In Review", "Approved", "Superseded"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentSection {
    pub heading: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChecklistItem {
    pub item: String,
    pub critical: bool,
}

impl SchemaContract for DocumentContract {
    const NAME: &'static str = "document";

    fn definition() -> Value {
        object(vec![
            (
                "metadata",
                object(vec![
                    ("documentId", string()),
                    ("title", string()),
                    ("documentType", enumeration(DocumentType::VALUES)),
                    ("status", enumeration(DocumentStatus::VALUES)),
                    ("version", string()),
                    ("effectiveDate", string()),
                    ("owner", string()),
                ]),
            ),
            (
                "sections",
                array(object(vec![("heading", string()), ("content", string())])),
            ),
            (
                "checklist",
                array(object(vec![("item", string()), ("critical", boolean())])),
            ),
            ("questions", questions()),
        ])
    }
}
