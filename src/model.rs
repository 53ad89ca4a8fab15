use serde::{Deserialize, Deserializer, Serialize};

use crate::surrogate::SurrogateKey;

/// One task record from the source export. Fields not listed here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub index: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team_ids: Vec<String>,
    #[serde(default)]
    pub created_user_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assignees_ids: Vec<String>,
    #[serde(default)]
    pub parent_task_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_activity_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<CustomField>,
}

impl Task {
    pub fn surrogate_key(&self) -> SurrogateKey {
        SurrogateKey::from(self.index)
    }

    /// Parent id, treating an empty string the same as no parent.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_task_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.as_deref().is_some_and(|ts| !ts.is_empty())
    }
}

/// Exports write `null` for cleared text and list fields; read those as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A typed custom field attached to a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub field_template_id: Option<String>,
    #[serde(default)]
    pub label: Option<FieldOption>,
    #[serde(default)]
    pub select_value: Option<FieldOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}
