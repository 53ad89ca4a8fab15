use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mapping::IdentityMaps;
use crate::model::Task;
use crate::surrogate::SurrogateKey;

/// Desired parent links, child key -> parent key.
///
/// Built once during export and persisted so the relink phase can run later
/// without the source data. Keys are unique because a task has at most one parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeSet(BTreeMap<SurrogateKey, SurrogateKey>);

impl EdgeSet {
    /// Collect an edge for every task whose parent id resolves to an exported task.
    /// Orphaned parent references are skipped.
    pub fn extract(tasks: &[Task], maps: &IdentityMaps) -> Self {
        Self(
            tasks
                .iter()
                .filter_map(|task| Some((task.surrogate_key(), maps.parent_key(task)?)))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parent_of(&self, child: SurrogateKey) -> Option<SurrogateKey> {
        self.0.get(&child).copied()
    }

    /// Edges in ascending child-key order.
    pub fn iter(&self) -> impl Iterator<Item = (SurrogateKey, SurrogateKey)> + '_ {
        self.0.iter().map(|(child, parent)| (*child, *parent))
    }
}

impl FromIterator<(SurrogateKey, SurrogateKey)> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = (SurrogateKey, SurrogateKey)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, index: u64, parent: Option<&str>) -> Task {
        Task {
            id: id.into(),
            index,
            parent_task_id: parent.map(Into::into),
            ..Task::default()
        }
    }

    #[test]
    fn extract_links_children_to_parents_by_key() {
        let tasks = vec![
            task("root", 1, None),
            task("child", 2, Some("root")),
            task("grandchild", 3, Some("child")),
        ];
        let maps = IdentityMaps::build(&tasks, &[], &[]);
        let edges = EdgeSet::extract(&tasks, &maps);

        assert_eq!(edges.len(), 2);
        assert_eq!(edges.parent_of(SurrogateKey::from(2)), Some(SurrogateKey::from(1)));
        assert_eq!(edges.parent_of(SurrogateKey::from(3)), Some(SurrogateKey::from(2)));
        assert_eq!(edges.parent_of(SurrogateKey::from(1)), None);
    }

    #[test]
    fn extract_skips_orphans_and_empty_parents() {
        let tasks = vec![
            task("a", 1, Some("deleted-task")),
            task("b", 2, Some("")),
        ];
        let maps = IdentityMaps::build(&tasks, &[], &[]);
        assert!(EdgeSet::extract(&tasks, &maps).is_empty());
    }

    #[test]
    fn serializes_as_flat_object_in_numeric_order() {
        let edges: EdgeSet = [
            (SurrogateKey::from(10), SurrogateKey::from(1)),
            (SurrogateKey::from(2), SurrogateKey::from(1)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&edges).unwrap();
        assert_eq!(json, r#"{"T-2":"T-1","T-10":"T-1"}"#);

        let parsed: EdgeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, edges);
    }

    #[test]
    fn rejects_keys_that_are_not_surrogates() {
        assert!(serde_json::from_str::<EdgeSet>(r#"{"ENG-4":"T-1"}"#).is_err());
    }
}
