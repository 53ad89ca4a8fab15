use serde::Serialize;

use crate::edges::EdgeSet;
use crate::reconcile::ReconciliationMap;
use crate::surrogate::SurrogateKey;
use crate::tracker::IssueTracker;

/// One parent link the destination is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedUpdate {
    pub child_key: SurrogateKey,
    pub parent_key: SurrogateKey,
    pub child_id: String,
    pub parent_id: String,
    pub child_identifier: String,
    pub parent_identifier: String,
    pub child_title: String,
}

/// An edge whose parent was not found among the destination's tagged issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingParent {
    pub child_key: SurrogateKey,
    pub parent_key: SurrogateKey,
    pub child_identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelinkPlan {
    pub updates: Vec<PlannedUpdate>,
    pub already_linked: usize,
    pub missing_child: usize,
    pub missing_parent: Vec<MissingParent>,
}

impl RelinkPlan {
    /// Diff the desired edges against the destination's current parents.
    ///
    /// Edges already satisfied produce nothing, so planning again after a
    /// successful apply yields an empty update list.
    pub fn build(edges: &EdgeSet, map: &ReconciliationMap) -> Self {
        let mut plan = Self::default();

        for (child_key, parent_key) in edges.iter() {
            let Some(child) = map.get(child_key) else {
                plan.missing_child += 1;
                continue;
            };
            let Some(parent) = map.get(parent_key) else {
                plan.missing_parent.push(MissingParent {
                    child_key,
                    parent_key,
                    child_identifier: child.identifier.clone(),
                });
                continue;
            };

            if child.current_parent_id() == Some(parent.destination_id.as_str()) {
                plan.already_linked += 1;
                continue;
            }

            plan.updates.push(PlannedUpdate {
                child_key,
                parent_key,
                child_id: child.destination_id.clone(),
                parent_id: parent.destination_id.clone(),
                child_identifier: child.identifier.clone(),
                parent_identifier: parent.identifier.clone(),
                child_title: child.title.clone(),
            });
        }

        plan
    }

    /// Only an explicit "yes" unlocks the mutation step.
    pub fn approve(&self, reply: &str) -> Option<ApprovedPlan<'_>> {
        reply
            .trim()
            .eq_ignore_ascii_case("yes")
            .then_some(ApprovedPlan { plan: self })
    }
}

/// Proof that the operator confirmed the plan; required by [`apply`].
#[derive(Debug, Clone, Copy)]
pub struct ApprovedPlan<'a> {
    plan: &'a RelinkPlan,
}

impl<'a> ApprovedPlan<'a> {
    pub fn updates(&self) -> &'a [PlannedUpdate] {
        &self.plan.updates
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateFailure {
    pub child_key: SurrogateKey,
    pub parent_key: SurrogateKey,
    pub child_identifier: String,
    pub parent_identifier: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub succeeded: usize,
    pub failures: Vec<UpdateFailure>,
}

impl ApplyOutcome {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len()
    }
}

/// Apply approved updates one at a time. A failed update is recorded and the
/// rest of the queue still runs.
pub fn apply<T>(
    tracker: &T,
    approved: ApprovedPlan<'_>,
    mut on_result: impl FnMut(usize, &PlannedUpdate, Option<&str>),
) -> ApplyOutcome
where
    T: IssueTracker + ?Sized,
{
    let mut outcome = ApplyOutcome::default();

    for (position, update) in approved.updates().iter().enumerate() {
        let failure = match tracker.update_parent(&update.child_id, &update.parent_id) {
            Ok(result) if result.success => None,
            Ok(_) => Some("destination rejected the update".to_string()),
            Err(err) => Some(err.to_string()),
        };

        on_result(position + 1, update, failure.as_deref());

        match failure {
            None => outcome.succeeded += 1,
            Some(reason) => outcome.failures.push(UpdateFailure {
                child_key: update.child_key,
                parent_key: update.parent_key,
                child_identifier: update.child_identifier.clone(),
                parent_identifier: update.parent_identifier.clone(),
                reason,
            }),
        }
    }

    outcome
}
