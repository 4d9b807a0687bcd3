mod store;

pub use store::{StepEntry, StepStore, StepUpdate};

use std::sync::Arc;

/// Unique identifier for each provisioning step.
///
/// The declaration order is the canonical workflow order: it defines both the
/// sequence the backend walks through and the render order of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepId {
    Init,
    Up,
    Auth,
    Secret,
    Policy,
    Role,
    Clean,
}

impl StepId {
    /// All steps in canonical workflow order.
    pub const ALL: [StepId; 7] = [
        StepId::Init,
        StepId::Up,
        StepId::Auth,
        StepId::Secret,
        StepId::Policy,
        StepId::Role,
        StepId::Clean,
    ];

    /// Wire name, as used by the backend and the locale table.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Init => "init",
            StepId::Up => "up",
            StepId::Auth => "auth",
            StepId::Secret => "secret",
            StepId::Policy => "policy",
            StepId::Role => "role",
            StepId::Clean => "clean",
        }
    }

    /// Parse a wire name. Unknown names are not an error here; the caller
    /// decides whether to skip the entry or reject the message.
    pub fn parse(name: &str) -> Option<StepId> {
        StepId::ALL.iter().copied().find(|id| id.as_str() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Display status of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepStatus {
    /// No update received for this step yet.
    #[default]
    None,
    Active,
    Finished,
    Failed,
}

impl StepStatus {
    /// Parse a wire status value. `None` is never sent explicitly; it is
    /// implied by the absence of a status field.
    pub fn parse(value: &str) -> Option<StepStatus> {
        match value {
            "active" => Some(StepStatus::Active),
            "finished" => Some(StepStatus::Finished),
            "failed" => Some(StepStatus::Failed),
            _ => None,
        }
    }

    /// Style class for the rendering layer. Total over the status set.
    pub fn style_class(&self) -> &'static str {
        match self {
            StepStatus::Active => "is-active",
            StepStatus::Finished => "is-finished",
            StepStatus::Failed => "is-failed",
            StepStatus::None => "is-none",
        }
    }
}

/// Last known state of a single step.
///
/// `reason` is only meaningful when `status` is `Failed`. A stale reason may
/// linger after a later non-failed update that carried one; the resolver is
/// responsible for never surfacing it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepState {
    pub status: StepStatus,
    pub reason: Option<String>,
}

/// Immutable point-in-time view of every step's state.
///
/// Cheap to clone and share: the step table lives behind an `Arc`, and the
/// store never mutates a published snapshot. A consumer holding a clone keeps
/// a stable view no matter how many updates arrive after it.
#[derive(Debug, Clone)]
pub struct WorkflowSnapshot {
    steps: Arc<[StepState; 7]>,
}

impl WorkflowSnapshot {
    /// Snapshot with every step at its default (`none`, no reason).
    pub fn empty() -> Self {
        Self {
            steps: Arc::new(std::array::from_fn(|_| StepState::default())),
        }
    }

    pub fn step(&self, id: StepId) -> &StepState {
        &self.steps[id.index()]
    }

    /// Steps in canonical workflow order.
    pub fn iter(&self) -> impl Iterator<Item = (StepId, &StepState)> {
        StepId::ALL.iter().map(|id| (*id, self.step(*id)))
    }

    /// Build the successor snapshot with the given steps replaced wholesale.
    pub(crate) fn with_replaced(
        &self,
        replacements: impl IntoIterator<Item = (StepId, StepState)>,
    ) -> Self {
        let mut steps = (*self.steps).clone();
        for (id, state) in replacements {
            steps[id.index()] = state;
        }
        Self {
            steps: Arc::new(steps),
        }
    }

    /// Whether two snapshots share the same underlying step table.
    pub fn same_as(&self, other: &WorkflowSnapshot) -> bool {
        Arc::ptr_eq(&self.steps, &other.steps)
    }
}

impl Default for WorkflowSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_round_trip() {
        for id in StepId::ALL {
            assert_eq!(StepId::parse(id.as_str()), Some(id));
        }
        assert_eq!(StepId::parse("bogus"), None);
    }

    #[test]
    fn canonical_order_is_the_workflow_sequence() {
        let names: Vec<&str> = StepId::ALL.iter().map(|id| id.as_str()).collect();
        assert_eq!(
            names,
            ["init", "up", "auth", "secret", "policy", "role", "clean"]
        );
    }

    #[test]
    fn unknown_status_values_are_rejected() {
        assert_eq!(StepStatus::parse("active"), Some(StepStatus::Active));
        assert_eq!(StepStatus::parse("none"), None);
        assert_eq!(StepStatus::parse("FAILED"), None);
    }

    #[test]
    fn empty_snapshot_defaults_every_step() {
        let snapshot = WorkflowSnapshot::empty();
        for (_, state) in snapshot.iter() {
            assert_eq!(state.status, StepStatus::None);
            assert_eq!(state.reason, None);
        }
    }
}
