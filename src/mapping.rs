use std::collections::HashMap;

use crate::error::{FerryError, Result};
use crate::model::{Task, Team, User};
use crate::surrogate::SurrogateKey;

/// Lookup tables shared by the row transformer and the relationship extractor.
///
/// Every lookup is total: an unknown id resolves to an empty string (or `None`
/// for task keys) rather than an error.
#[derive(Debug, Clone, Default)]
pub struct IdentityMaps {
    teams: HashMap<String, String>,
    users: HashMap<String, String>,
    tasks: HashMap<String, SurrogateKey>,
}

impl IdentityMaps {
    pub fn build(tasks: &[Task], teams: &[Team], users: &[User]) -> Self {
        let teams = teams
            .iter()
            .filter_map(|team| Some((team.id.clone(), team.name.clone()?)))
            .collect();
        let users = users
            .iter()
            .filter_map(|user| Some((user.id.clone(), user.email.clone()?)))
            .collect();
        let tasks = tasks
            .iter()
            .map(|task| (task.id.clone(), task.surrogate_key()))
            .collect();

        Self {
            teams,
            users,
            tasks,
        }
    }

    pub fn team_name(&self, team_id: &str) -> &str {
        self.teams.get(team_id).map(String::as_str).unwrap_or("")
    }

    pub fn user_handle(&self, user_id: &str) -> &str {
        self.users.get(user_id).map(String::as_str).unwrap_or("")
    }

    pub fn task_key(&self, task_id: &str) -> Option<SurrogateKey> {
        self.tasks.get(task_id).copied()
    }

    /// Surrogate key of the task's parent, if it has one that exists in the export.
    pub fn parent_key(&self, task: &Task) -> Option<SurrogateKey> {
        task.parent_id().and_then(|id| self.task_key(id))
    }
}

/// Reject exports where two tasks would produce the same `T-{index}` key.
pub fn ensure_unique_indices(tasks: &[Task]) -> Result<()> {
    let mut seen: HashMap<u64, &str> = HashMap::with_capacity(tasks.len());
    for task in tasks {
        if let Some(first) = seen.insert(task.index, &task.id) {
            return Err(FerryError::DuplicateIndex {
                index: task.index,
                first: first.to_string(),
                second: task.id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, index: u64) -> Task {
        Task {
            id: id.into(),
            index,
            ..Task::default()
        }
    }

    #[test]
    fn build_resolves_known_ids() {
        let maps = IdentityMaps::build(
            &[task("a", 1), task("b", 2)],
            &[Team {
                id: "t1".into(),
                name: Some("Engineering".into()),
            }],
            &[User {
                id: "u1".into(),
                email: Some("ada@example.com".into()),
            }],
        );

        assert_eq!(maps.team_name("t1"), "Engineering");
        assert_eq!(maps.user_handle("u1"), "ada@example.com");
        assert_eq!(maps.task_key("b"), Some(SurrogateKey::from(2)));
    }

    #[test]
    fn unknown_and_incomplete_records_resolve_to_empty() {
        let maps = IdentityMaps::build(
            &[],
            &[
                Team {
                    id: "t1".into(),
                    name: None,
                },
                Team {
                    id: "t2".into(),
                    name: None,
                },
            ],
            &[User {
                id: "u1".into(),
                email: None,
            }],
        );

        assert_eq!(maps.team_name("t1"), "");
        assert_eq!(maps.team_name("t2"), "");
        assert_eq!(maps.team_name("missing"), "");
        assert_eq!(maps.user_handle("u1"), "");
        assert_eq!(maps.task_key("missing"), None);
    }

    #[test]
    fn parent_key_skips_orphans() {
        let mut child = task("c", 3);
        child.parent_task_id = Some("gone".into());
        let maps = IdentityMaps::build(&[child.clone()], &[], &[]);
        assert_eq!(maps.parent_key(&child), None);
    }

    #[test]
    fn duplicate_indices_are_rejected() {
        let err = ensure_unique_indices(&[task("a", 5), task("b", 6), task("c", 5)]).unwrap_err();
        let FerryError::DuplicateIndex {
            index,
            first,
            second,
        } = err
        else {
            panic!("expected duplicate index error");
        };
        assert_eq!(index, 5);
        assert_eq!(first, "a");
        assert_eq!(second, "c");
    }

    #[test]
    fn unique_indices_pass() {
        ensure_unique_indices(&[task("a", 1), task("b", 2)]).unwrap();
    }
}
