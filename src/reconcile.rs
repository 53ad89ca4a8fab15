use std::collections::HashMap;

use serde::Serialize;

use crate::error::{FerryError, Result};
use crate::surrogate::SurrogateKey;
use crate::tracker::{IssueNode, IssueRef, IssueTracker};

/// What the destination currently holds for one imported task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledIssue {
    pub destination_id: String,
    pub identifier: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_parent: Option<IssueRef>,
}

impl ReconciledIssue {
    pub fn current_parent_id(&self) -> Option<&str> {
        self.current_parent.as_ref().map(|parent| parent.id.as_str())
    }
}

/// Surrogate key -> destination issue, rebuilt from a fresh listing on every run.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationMap {
    entries: HashMap<SurrogateKey, ReconciledIssue>,
    duplicates: Vec<SurrogateKey>,
}

impl ReconciliationMap {
    /// Index issues by the key embedded in their body. Untagged issues are left out.
    /// When two issues carry the same tag the later one wins and the key is noted.
    pub fn build(issues: &[IssueNode]) -> Self {
        let mut map = Self::default();
        for issue in issues {
            let Some(key) = issue
                .description
                .as_deref()
                .and_then(SurrogateKey::extract_from_body)
            else {
                continue;
            };

            let entry = ReconciledIssue {
                destination_id: issue.id.clone(),
                identifier: issue.identifier.clone(),
                title: issue.title.clone(),
                current_parent: issue.parent.clone(),
            };
            if map.entries.insert(key, entry).is_some() && !map.duplicates.contains(&key) {
                map.duplicates.push(key);
            }
        }
        map.duplicates.sort();
        map
    }

    pub fn get(&self, key: SurrogateKey) -> Option<&ReconciledIssue> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys that appeared on more than one destination issue.
    pub fn duplicates(&self) -> &[SurrogateKey] {
        &self.duplicates
    }
}

/// Walk every page of the listing and return all issues.
///
/// Any fetch error aborts the whole listing; callers restart from the first page.
pub fn fetch_all_issues<T>(
    tracker: &T,
    team_key: Option<&str>,
    mut on_page: impl FnMut(usize),
) -> Result<Vec<IssueNode>>
where
    T: IssueTracker + ?Sized,
{
    let mut issues = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = tracker.fetch_issue_page(team_key, cursor.as_deref())?;
        issues.extend(page.nodes);
        on_page(issues.len());

        if !page.page_info.has_next_page {
            break;
        }
        match page.page_info.end_cursor {
            Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
            Some(_) => {
                return Err(FerryError::Protocol(
                    "pagination cursor did not advance".into(),
                ));
            }
            None => {
                return Err(FerryError::Protocol(
                    "hasNextPage set without an endCursor".into(),
                ));
            }
        }
    }

    Ok(issues)
}
