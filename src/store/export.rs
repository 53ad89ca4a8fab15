use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{FerryError, Result};
use crate::mapping::ensure_unique_indices;
use crate::model::{Task, Team, User};

pub const TASKS_FILE: &str = "tasks.json";
pub const TEAMS_FILE: &str = "teams.json";
pub const USERS_FILE: &str = "users.json";

/// The three record collections of a source export directory.
#[derive(Debug, Clone, Default)]
pub struct SourceExport {
    pub tasks: Vec<Task>,
    pub teams: Vec<Team>,
    pub users: Vec<User>,
}

impl SourceExport {
    /// Read `tasks.json`, `teams.json` and `users.json` from `dir`.
    ///
    /// A missing file aborts the load; so does a sequence index shared by two tasks.
    pub fn load(dir: &Path) -> Result<Self> {
        let tasks: Vec<Task> = read_records(&dir.join(TASKS_FILE))?;
        let teams = read_records(&dir.join(TEAMS_FILE))?;
        let users = read_records(&dir.join(USERS_FILE))?;

        ensure_unique_indices(&tasks)?;

        Ok(Self {
            tasks,
            teams,
            users,
        })
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.is_file() {
        return Err(FerryError::MissingInput(path.to_path_buf()));
    }
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| invalid_export(path, err))
}

fn invalid_export(path: &Path, err: serde_json::Error) -> FerryError {
    FerryError::InvalidExport {
        path: PathBuf::from(path),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_export(dir: &Path, tasks: &str) {
        fs::write(dir.join(TASKS_FILE), tasks).unwrap();
        fs::write(dir.join(TEAMS_FILE), r#"[{"id": "t1", "name": "Eng"}]"#).unwrap();
        fs::write(
            dir.join(USERS_FILE),
            r#"[{"id": "u1", "email": "a@b.c"}, {"id": "u2"}]"#,
        )
        .unwrap();
    }

    #[test]
    fn load_reads_all_three_collections() {
        let dir = tempdir().unwrap();
        write_export(dir.path(), r#"[{"id": "x", "index": 1, "name": "One"}]"#);

        let export = SourceExport::load(dir.path()).unwrap();
        assert_eq!(export.tasks.len(), 1);
        assert_eq!(export.teams.len(), 1);
        assert_eq!(export.users.len(), 2);
        assert_eq!(export.users[1].email, None);
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(TASKS_FILE), "[]").unwrap();

        let err = SourceExport::load(dir.path()).unwrap_err();
        let FerryError::MissingInput(path) = err else {
            panic!("expected missing input error");
        };
        assert!(path.ends_with(TEAMS_FILE));
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempdir().unwrap();
        write_export(dir.path(), r#"{"not": "a list"}"#);

        let err = SourceExport::load(dir.path()).unwrap_err();
        assert_eq!(err.code(), "invalid_export");
        assert!(err.to_string().contains(TASKS_FILE));
    }

    #[test]
    fn colliding_indices_are_fatal() {
        let dir = tempdir().unwrap();
        write_export(
            dir.path(),
            r#"[{"id": "x", "index": 3}, {"id": "y", "index": 3}]"#,
        );

        let err = SourceExport::load(dir.path()).unwrap_err();
        assert_eq!(err.code(), "duplicate_index");
    }
}
