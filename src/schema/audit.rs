//! Audit report contract (audit workflow)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::contract::{array, enumeration, object, questions, string, SchemaContract};

/// A generated audit report with findings and a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuditContract {
    pub metadata: AuditMetadata,
    pub findings: Vec<AuditFinding>,
    pub checklist: Vec<AuditCheck>,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuditMetadata {
    pub audit_id: String,
    pub title: String,
    pub audit_type: AuditType,
    pub status: AuditStatus,
    pub audit_date: String,
    pub auditor: String,
    /// Standard or policy audited against
    pub standard: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditType {
    Internal,
    External,
    Supplier,
    #[serde(rename = "Site Inspection")]
    SiteInspection,
}

impl AuditType {
    pub const VALUES: &'static [&'static str] = &["Internal", "External", "Supplier", "Site Inspection"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditStatus {
    Planned,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Closed,
}

impl AuditStatus {
    pub const VALUES: &'static [&'static str] = &["Planned", "In Progress", "Completed", "Closed"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuditFinding {
    pub finding_id: String,
    pub clause: String,
    pub description: String,
    pub severity: Severity,
    pub corrective_action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Observation,
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub const VALUES: &'static [&'static str] = &["Observation", "Minor", "Major", "Critical"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuditCheck {
    pub question: String,
    pub response: CheckResponse,
    pub evidence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckResponse {
    Yes,
    No,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl CheckResponse {
    pub const VALUES: &'static [&'static str] = &["Yes", "No", "N/A"];
}

impl SchemaContract for AuditContract {
    const NAME: &'static str = "audit_report";

    fn definition() -> Value {
        object(vec![
            (
                "metadata",
                object(vec![
                    ("auditId", string()),
                    ("title", string()),
                    ("auditType", enumeration(AuditType::VALUES)),
                    ("status", enumeration(AuditStatus::VALUES)),
                    ("auditDate", string()),
                    ("auditor", string()),
                    ("standard", string()),
                ]),
            ),
            (
                "findings",
                array(object(vec![
                    ("findingId", string()),
                    ("clause", string()),
                    ("description", string()),
                    ("severity", enumeration(Severity::VALUES)),
                    ("correctiveAction", string()),
                ])),
            ),
            (
                "checklist",
                array(object(vec![
                    ("question", string()),
                    ("response", enumeration(CheckResponse::VALUES)),
                    ("evidence", string()),
                ])),
            ),
            ("questions", questions()),
        ])
    }
}
