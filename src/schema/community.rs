//! Community-action request contract

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::contract::{array, enumeration, object, questions, string, SchemaContract};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommunityActionContract {
    pub metadata: CommunityMetadata,
    pub actions: Vec<CommunityAction>,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommunityMetadata {
    pub request_id: String,
    pub category: CommunityCategory,
    pub status: RequestStatus,
    pub requested_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunityCategory {
    Volunteer,
    Donation,
    Sponsorship,
    Event,
}

impl CommunityCategory {
    pub const VALUES: &'static [&'static str] = &["Volunteer", "Donation", "Sponsorship", "Event"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Proposed,
    Approved,
    Declined,
}

impl RequestStatus {
    pub const VALUES: &'static [&'static str] = &["Proposed", "Approved", "Declined"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommunityAction {
    pub description: String,
    pub owner: String,
    pub due_date: String,
}

impl SchemaContract for CommunityActionContract {
    const NAME: &'static str = "community_action";

    fn definition() -> Value {
        object(vec![
            (
                "metadata",
                object(vec![
                    ("requestId", string()),
                    ("category", enumeration(CommunityCategory::VALUES)),
                    ("status", enumeration(RequestStatus::VALUES)),
                    ("requestedDate", string()),
                ]),
            ),
            (
                "actions",
                array(object(vec![
                    ("description", string()),
                    ("owner", string()),
                    ("dueDate", string()),
                ])),
            ),
            ("questions", questions()),
        ])
    }
}
