use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Destination-side capability consumed by the relink phase.
pub trait IssueTracker {
    /// One page of issues, optionally scoped to a team key, starting after `after`.
    fn fetch_issue_page(&self, team_key: Option<&str>, after: Option<&str>) -> Result<IssuePage>;

    /// Point a single issue at a new parent.
    fn update_parent(&self, issue_id: &str, parent_id: &str) -> Result<ParentUpdate>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePage {
    #[serde(default)]
    pub nodes: Vec<IssueNode>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueNode {
    pub id: String,
    pub identifier: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<IssueRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub id: String,
    #[serde(default)]
    pub identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentUpdate {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub issue: Option<UpdatedIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedIssue {
    pub id: String,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub parent: Option<IssueRef>,
}
