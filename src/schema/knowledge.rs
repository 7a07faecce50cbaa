//! Knowledge Q&A contract

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::contract::{array, enumeration, object, questions, string, SchemaContract};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KnowledgeContract {
    pub metadata: KnowledgeMetadata,
    pub answer: String,
    pub sources: Vec<KnowledgeSource>,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KnowledgeMetadata {
    pub topic: String,
    pub confidence: Confidence,
    pub answered_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub const VALUES: &'static [&'static str] = &["High", "Medium", "Low"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KnowledgeSource {
    pub title: String,
    pub reference: String,
}

impl SchemaContract for KnowledgeContract {
    const NAME: &'static str = "knowledge_answer";

    fn definition() -> Value {
        object(vec![
            (
                "metadata",
                object(vec![
                    ("topic", string()),
                    ("confidence", enumeration(Confidence::VALUES)),
                    ("answeredAt", string()),
                ]),
            ),
            ("answer", string()),
            (
                "sources",
                array(object(vec![("title", string()), ("reference", string())])),
            ),
            ("questions", questions()),
        ])
    }
}
