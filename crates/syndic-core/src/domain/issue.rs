//! Maintenance issue domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Plumbing,
    Electrical,
    Heating,
    Elevator,
    Security,
    Cleaning,
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 7] = [
        IssueType::Plumbing,
        IssueType::Electrical,
        IssueType::Heating,
        IssueType::Elevator,
        IssueType::Security,
        IssueType::Cleaning,
        IssueType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Plumbing => "plumbing",
            IssueType::Electrical => "electrical",
            IssueType::Heating => "heating",
            IssueType::Elevator => "elevator",
            IssueType::Security => "security",
            IssueType::Cleaning => "cleaning",
            IssueType::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Open,
    Closed,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::Closed => "closed",
        }
    }
}

/// Issue entry stored in the apartment's issue array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub apartment_id: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub description: String,
    pub reporter_name: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub status: IssueStatus,
    pub reported_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.status == IssueStatus::Open
    }
}

#[derive(Debug, Clone, Validate)]
pub struct NewIssue {
    pub issue_type: IssueType,

    #[validate(length(min = 5, max = 1000, message = "Description must be between 5 and 1000 characters"))]
    pub description: String,
}
