use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::mapping::IdentityMaps;
use crate::model::{CustomField, Task};

pub const COLUMN_COUNT: usize = 30;

/// Column set of the destination bulk-import file, in output order.
pub const HEADERS: [&str; COLUMN_COUNT] = [
    "ID",
    "Team",
    "Title",
    "Description",
    "Status",
    "Estimate",
    "Priority",
    "Project ID",
    "Project",
    "Creator",
    "Assignee",
    "Labels",
    "Cycle Number",
    "Cycle Name",
    "Cycle Start",
    "Cycle End",
    "Created",
    "Updated",
    "Started",
    "Triaged",
    "Completed",
    "Canceled",
    "Archived",
    "Due Date",
    "Parent issue",
    "Initiatives",
    "Project Milestone ID",
    "Project Milestone",
    "SLA Status",
    "Roadmaps",
];

pub const DONE_STATUS: &str = "Done";

const STATUS_TABLE: &[(&str, &str)] = &[
    ("backLog", "Backlog"),
    ("done", "Done"),
    ("inProgress", "In Progress"),
    ("Open", "Open"),
    ("Closed", "Done"),
    ("c79706e5-618d-4c3f-a31c-38e2b45c3afb", "Backlog"),
    ("1719cfde-fdf7-4d15-83bd-6bc1e6f46b3b", "Todo"),
    ("28e2b389-fb49-4595-a5f6-c338553dbbc2", "Todo"),
    ("1eb8b8d9-9f0a-4f31-9d19-b01f841a9ffb", "Todo"),
    ("7aa06750-ed00-4d8d-80a1-9946317cd01a", "Todo"),
    ("877844db-f8be-45b2-ba3b-606c93871542", "Todo"),
    ("62e6162e-c5af-4f73-863d-e7c1f9fb03cc", "Todo"),
    ("d6a747d1-a448-440f-973a-129731f79dd3", "Todo"),
    ("ce2bb19b-bdfb-41e2-8562-14a65e26e0db", "Todo"),
    ("4e1f732d-5694-4af4-befb-487d982c66da", "Todo"),
];

const PRIORITY_FIELD_NAME: &str = "Priority";
const PRIORITY_TEMPLATE_IDS: [&str; 2] = [
    "e5b1cb21-c337-4511-903b-861ed1cc9ae5",
    "b88e01b3-3028-47f1-8076-e6967fc31710",
];

const SYNC_MARKER: &str = "┆Task is synchronized with this Gitlab issue by Unito";

const DISPLAY_DATE_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT+0000 (GMT)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Put the surrogate key in the `ID` column instead of leaving it for the destination.
    pub embed_source_id: bool,
}

/// One task flattened into the destination's import columns.
///
/// Columns this pipeline never fills are not stored; `to_record` emits them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationRow {
    pub id: String,
    pub team: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub creator: String,
    pub assignee: String,
    pub created: String,
    pub updated: String,
    pub started: String,
    pub completed: String,
    pub parent_issue: String,
}

impl DestinationRow {
    pub fn to_record(&self) -> [&str; COLUMN_COUNT] {
        [
            self.id.as_str(),
            self.team.as_str(),
            self.title.as_str(),
            self.description.as_str(),
            self.status.as_str(),
            "",
            self.priority.as_str(),
            "",
            "",
            self.creator.as_str(),
            self.assignee.as_str(),
            "",
            "",
            "",
            "",
            "",
            self.created.as_str(),
            self.updated.as_str(),
            self.started.as_str(),
            "",
            self.completed.as_str(),
            "",
            "",
            "",
            self.parent_issue.as_str(),
            "",
            "",
            "",
            "",
            "",
        ]
    }
}

pub fn transform_task(
    task: &Task,
    maps: &IdentityMaps,
    options: TransformOptions,
) -> DestinationRow {
    let key = task.surrogate_key();

    let team = task
        .team_ids
        .first()
        .map(|id| maps.team_name(id))
        .unwrap_or_default();
    let creator = task
        .created_user_id
        .as_deref()
        .map(|id| maps.user_handle(id))
        .unwrap_or_default();
    let assignee = task
        .assignees_ids
        .first()
        .map(|id| maps.user_handle(id))
        .unwrap_or_default();
    let parent_issue = maps
        .parent_key(task)
        .map(|parent| parent.to_string())
        .unwrap_or_default();

    let status = if task.is_completed() {
        DONE_STATUS.to_string()
    } else {
        normalize_status(&task.status).to_string()
    };

    let body = clean_description(&task.description);
    let description = if body.is_empty() {
        key.import_tag()
    } else {
        format!("{}\n\n{}", key.import_tag(), body)
    };

    DestinationRow {
        id: if options.embed_source_id {
            key.to_string()
        } else {
            String::new()
        },
        team: team.to_string(),
        title: task.name.clone(),
        description,
        status,
        priority: extract_priority(&task.fields),
        creator: creator.to_string(),
        assignee: assignee.to_string(),
        created: display_date(task.created_at.as_deref()),
        updated: display_date(task.last_activity_at.as_deref()),
        started: display_date(task.started_at.as_deref()),
        completed: display_date(effective_completed_at(task)),
        parent_issue,
    }
}

/// Map a source status name or id to a destination label; unknown values pass through.
pub fn normalize_status(status: &str) -> &str {
    STATUS_TABLE
        .iter()
        .find(|(source, _)| *source == status)
        .map(|(_, label)| *label)
        .unwrap_or(status)
}

/// First priority-tagged field carrying a label or select value wins.
pub fn extract_priority(fields: &[CustomField]) -> String {
    fields
        .iter()
        .filter(|field| is_priority_field(field))
        .find_map(|field| field.label.as_ref().or(field.select_value.as_ref()))
        .and_then(|option| option.value.clone())
        .unwrap_or_default()
}

fn is_priority_field(field: &CustomField) -> bool {
    field.name.as_deref() == Some(PRIORITY_FIELD_NAME)
        || field
            .field_template_id
            .as_deref()
            .is_some_and(|id| PRIORITY_TEMPLATE_IDS.contains(&id))
}

pub fn clean_description(description: &str) -> String {
    let stripped = description.replace(SYNC_MARKER, "");
    stripped
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Completion timestamps earlier than creation are a source defect; use last activity instead.
fn effective_completed_at(task: &Task) -> Option<&str> {
    let completed = task.completed_at.as_deref();
    let created = task.created_at.as_deref();

    match (completed.and_then(parse_timestamp), created.and_then(parse_timestamp)) {
        (Some(done), Some(created)) if done < created => {
            task.last_activity_at.as_deref().or(completed)
        }
        _ => completed,
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render an ISO 8601 timestamp in the destination's display format; bad input yields "".
pub fn display_date(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|ts| ts.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
